use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Value, json};

use crate::excel::CellValue;
use crate::json_export::types::{OrderedRecord, ROW_INDEX_KEY};
use crate::table::Record;

// Convert Excel date number to ISO date string
pub fn excel_date_to_iso_string(excel_date: f64) -> Option<String> {
    // Serial 60 is the fictional 1900-02-29
    let days = if excel_date > 59.0 {
        excel_date - 1.0
    } else {
        excel_date
    };

    let base_date = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    let whole_days = days.trunc() as i64;
    let fractional_day = days.fract();

    // Excel day 1 is 1900-01-01
    let date = base_date.checked_add_signed(Duration::days(whole_days - 1))?;

    if fractional_day > 0.0 {
        let seconds = (fractional_day * 86_400.0).round() as u32;
        let time = NaiveTime::from_hms_opt(seconds / 3600, (seconds % 3600) / 60, seconds % 60)?;

        Some(
            NaiveDateTime::new(date, time)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        )
    } else {
        Some(date.format("%Y-%m-%d").to_string())
    }
}

pub fn cell_to_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::String(s) if s.is_empty() => Value::Null,
        CellValue::String(s) => json!(s),
        CellValue::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                json!(f.trunc() as i64)
            } else {
                json!(f)
            }
        }
        CellValue::Int(i) => json!(i),
        CellValue::Bool(b) => json!(b),
        CellValue::DateTime(dt) => {
            match (*dt >= 0.0).then(|| excel_date_to_iso_string(*dt)).flatten() {
                Some(iso) => json!(iso),
                None => json!(dt),
            }
        }
        CellValue::Error(e) => json!(e),
    }
}

pub fn json_to_cell(value: &Value) -> Result<CellValue> {
    let cell = match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => match n.as_f64() {
                Some(f) => CellValue::Float(f),
                None => anyhow::bail!("Number {} does not fit in a cell", n),
            },
        },
        Value::String(s) => CellValue::String(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            anyhow::bail!("Cell values must be scalars, got {}", value)
        }
    };

    Ok(cell)
}

/// `rowIndex` first, then the fields in header order.
pub fn record_to_json(record: &Record) -> OrderedRecord {
    let mut object = OrderedRecord::with_capacity(record.len() + 1);

    if let Some(row_index) = record.row_index() {
        object.insert(ROW_INDEX_KEY.to_string(), json!(row_index));
    }

    for (header, cell) in record.fields() {
        object.insert(header.clone(), cell_to_json(cell));
    }

    object
}

/// Build a record from a JSON object. An integer `rowIndex` becomes the record's row index.
pub fn record_from_json(value: &Value) -> Result<Record> {
    let Value::Object(map) = value else {
        anyhow::bail!("Expected a JSON object for a record, got {}", value);
    };

    let mut record = Record::new();

    for (key, field) in map {
        if key == ROW_INDEX_KEY {
            let row_index = field
                .as_u64()
                .ok_or_else(|| anyhow::anyhow!("'{}' must be a positive integer", ROW_INDEX_KEY))?;
            record.set_row_index(Some(row_index as usize));
            continue;
        }

        let cell = json_to_cell(field)
            .map_err(|e| anyhow::anyhow!("Field '{}': {}", key, e))?;
        record.insert(key.as_str(), cell);
    }

    Ok(record)
}

/// One record from an object, or one per element from an array of objects.
pub fn records_from_json(value: &Value) -> Result<Vec<Record>> {
    match value {
        Value::Array(items) => items.iter().map(record_from_json).collect(),
        _ => Ok(vec![record_from_json(value)?]),
    }
}
