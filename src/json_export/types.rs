use indexmap::IndexMap;
use serde_json::Value;

/// JSON field name for the row a record was read from.
pub const ROW_INDEX_KEY: &str = "rowIndex";

pub type OrderedRecord = IndexMap<String, Value>;
