mod executor;

pub use executor::{
    Command, Destination, Execution, SheetSelection, execute, parse_record_input,
};
