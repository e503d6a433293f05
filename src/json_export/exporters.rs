use anyhow::{Context, Result};
use serde::Serialize;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::json_export::converters::record_to_json;
use crate::json_export::types::OrderedRecord;
use crate::table::Record;

pub fn serialize_to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize data to JSON")
}

fn write_json_to_file<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;

    let json_string = serialize_to_json(data)?;

    file.write_all(json_string.as_bytes())
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    Ok(())
}

pub fn records_to_json<'a, I>(records: I) -> Vec<OrderedRecord>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().map(record_to_json).collect()
}

// Export records as a JSON array file
pub fn export_records_json<'a, I>(records: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a Record>,
{
    write_json_to_file(&records_to_json(records), path)?;
    log::info!("Wrote records to {}", path.display());
    Ok(())
}
