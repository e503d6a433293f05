mod cell;
mod sheet;
mod workbook;

pub use cell::{CellType, CellValue};
pub use sheet::{MAX_COLUMNS, MAX_ROWS, Sheet};
pub use workbook::{Workbook, open_workbook};
