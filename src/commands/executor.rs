use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::excel::{CellValue, Workbook};
use crate::json_export::{export_records_json, records_from_json, records_to_json, serialize_to_json};
use crate::table::{DeleteOutcome, MissingField, Record, SheetAccess, Table, TableOptions};
use crate::utils::parse_range;

/// One record operation against the bound sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Headers,
    List {
        range: Option<String>,
        json_out: Option<PathBuf>,
    },
    Add {
        records: Vec<Record>,
    },
    Update {
        row: usize,
        record: Record,
        keep_missing: bool,
    },
    Delete {
        range: String,
    },
}

/// Where a modified workbook gets written.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    /// `<stem>_<timestamp>.xlsx` next to the source
    Timestamped,
    InPlace,
    Path(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct SheetSelection {
    pub name: Option<String>,
    pub frozen_rows: Option<usize>,
}

#[derive(Debug)]
pub struct Execution {
    /// JSON to print on stdout
    pub output: String,
    pub saved_to: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListSummary {
    records: usize,
    skipped: usize,
    written_to: PathBuf,
}

#[derive(Serialize)]
struct Appended {
    appended: Vec<usize>,
}

#[derive(Serialize)]
struct Updated {
    updated: usize,
}

#[derive(Serialize)]
struct Deleted {
    row: usize,
    count: usize,
}

/// Parse record input from an optional JSON document plus `HEADER=VALUE` pairs.
///
/// Without JSON the pairs form a single record. With JSON the pairs are
/// applied to every record it contains.
pub fn parse_record_input(json: Option<&str>, assignments: &[String]) -> Result<Vec<Record>> {
    let mut records = match json {
        Some(text) => {
            let value: Value = serde_json::from_str(text).context("Record input is not valid JSON")?;
            records_from_json(&value)?
        }
        None => vec![Record::new()],
    };

    for assignment in assignments {
        let Some((header, raw)) = assignment.split_once('=') else {
            anyhow::bail!("Expected HEADER=VALUE, got '{}'", assignment);
        };
        let value = CellValue::infer(raw);
        for record in &mut records {
            record.insert(header.trim(), value.clone());
        }
    }

    if records.iter().all(Record::is_empty) {
        anyhow::bail!("No record fields given: pass JSON or at least one --set HEADER=VALUE");
    }

    Ok(records)
}

pub fn execute(
    workbook: &mut Workbook,
    selection: &SheetSelection,
    command: Command,
    destination: &Destination,
) -> Result<Execution> {
    let keep_missing = matches!(command, Command::Update { keep_missing: true, .. });
    let options = TableOptions {
        missing_field: if keep_missing {
            MissingField::Keep
        } else {
            MissingField::Blank
        },
    };

    let (output, modified) = {
        let sheet = workbook.sheet_mut(selection.name.as_deref())?;
        if let Some(frozen_rows) = selection.frozen_rows {
            sheet.frozen_rows = frozen_rows;
        }
        let sheet_name = sheet.name.clone();

        let mut table = Table::with_options(sheet, options)
            .with_context(|| format!("Cannot read records from sheet '{}'", sheet_name))?;

        match command {
            Command::Headers => (serialize_to_json(&table.headers())?, false),

            Command::List { range, json_out } => {
                let batch = match range {
                    Some(range) => {
                        let range = parse_range(&range, table.sheet().last_column())?;
                        table.records(&range)?
                    }
                    None => table.all_records()?,
                };

                let skipped = batch.skipped().count();
                if skipped > 0 {
                    log::warn!("Skipped {} malformed rows in sheet '{}'", skipped, sheet_name);
                }

                let output = match json_out {
                    Some(path) => {
                        export_records_json(batch.records(), &path)?;
                        serialize_to_json(&ListSummary {
                            records: batch.records().count(),
                            skipped,
                            written_to: path,
                        })?
                    }
                    None => serialize_to_json(&records_to_json(batch.records()))?,
                };

                (output, false)
            }

            Command::Add { records } => {
                let appended = table.add_records(&records)?;
                (serialize_to_json(&Appended { appended })?, true)
            }

            Command::Update { row, record, .. } => {
                if row < table.first_record_index() {
                    log::warn!(
                        "Row {} is a header row of sheet '{}'; overwriting it anyway",
                        row,
                        sheet_name
                    );
                }
                table.update_record(row, &record)?;
                (serialize_to_json(&Updated { updated: row })?, true)
            }

            Command::Delete { range } => {
                let range = parse_range(&range, table.sheet().last_column())?;
                match table.delete_records(&range)? {
                    DeleteOutcome::Deleted { row, count } => {
                        (serialize_to_json(&Deleted { row, count })?, true)
                    }
                    DeleteOutcome::OutOfRange {
                        range,
                        first_record_row,
                        last_row,
                    } => anyhow::bail!(
                        "Range {} is outside the record rows {}..={}; nothing deleted",
                        range,
                        first_record_row,
                        last_row
                    ),
                }
            }
        }
    };

    if !modified {
        return Ok(Execution {
            output,
            saved_to: None,
        });
    }

    workbook.set_modified(true);
    let path = match destination {
        Destination::Timestamped => workbook.timestamped_path(),
        Destination::InPlace => workbook.get_file_path().to_path_buf(),
        Destination::Path(path) => path.clone(),
    };
    save(workbook, &path)?;

    Ok(Execution {
        output,
        saved_to: Some(path),
    })
}

fn save(workbook: &mut Workbook, path: &Path) -> Result<()> {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "xlsx" | "xlsm"));
    if !is_xlsx {
        log::warn!(
            "{} will be written in xlsx format regardless of its extension",
            path.display()
        );
    }

    workbook.save_to(path)
}
