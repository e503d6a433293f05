pub mod commands;
pub mod excel;
pub mod json_export;
pub mod logging;
pub mod table;
pub mod utils;
