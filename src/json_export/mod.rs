mod converters;
mod exporters;
mod types;

pub use converters::{
    cell_to_json, excel_date_to_iso_string, json_to_cell, record_from_json, record_to_json,
    records_from_json,
};
pub use exporters::{export_records_json, records_to_json, serialize_to_json};
pub use types::{OrderedRecord, ROW_INDEX_KEY};
