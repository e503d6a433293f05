use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::Local;
use rust_xlsxwriter::{Format, Formula, Workbook as XlsxWorkbook};
use std::path::{Path, PathBuf};

use crate::excel::{CellType, CellValue, Sheet};

pub struct Workbook {
    sheets: Vec<Sheet>,
    file_path: PathBuf,
    is_modified: bool,
}

pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path_ref = path.as_ref();

    let mut workbook = open_workbook_auto(path_ref)
        .with_context(|| format!("Unable to parse Excel file: {}", path_ref.display()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .with_context(|| format!("Unable to read worksheet: {}", name))?;

        sheets.push(create_sheet_from_range(name, range));
    }

    if sheets.is_empty() {
        anyhow::bail!("No worksheets found in file");
    }

    log::debug!("Opened {} with {} sheets", path_ref.display(), sheets.len());

    Ok(Workbook {
        sheets,
        file_path: path_ref.to_path_buf(),
        is_modified: false,
    })
}

fn create_sheet_from_range(name: &str, range: calamine::Range<Data>) -> Sheet {
    let mut sheet = Sheet::new(name);

    // calamine ranges start at the first used cell, not at A1
    let (row_offset, col_offset) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    for (row_idx, col_idx, cell) in range.used_cells() {
        let value = CellValue::from(cell);
        if !value.is_empty() {
            sheet.set_cell(row_offset + row_idx + 1, col_offset + col_idx + 1, value);
        }
    }

    sheet
}

impl Workbook {
    pub fn get_sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Sheet by name, or the first sheet when `name` is `None`.
    pub fn sheet_mut(&mut self, name: Option<&str>) -> Result<&mut Sheet> {
        match name {
            None => self
                .sheets
                .first_mut()
                .context("Workbook has no worksheets"),
            Some(name) => {
                let available = self.get_sheet_names().join(", ");
                self.sheets
                    .iter_mut()
                    .find(|s| s.name == name)
                    .with_context(|| {
                        format!("Sheet '{}' not found (available: {})", name, available)
                    })
            }
        }
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.is_modified = modified;
    }

    pub fn get_file_path(&self) -> &Path {
        &self.file_path
    }

    /// `<stem>_<timestamp>.xlsx` next to the source file.
    pub fn timestamped_path(&self) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let file_stem = self
            .file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sheet");
        let parent_dir = self.file_path.parent().unwrap_or_else(|| Path::new(""));

        parent_dir.join(format!("{}_{}.xlsx", file_stem, timestamp))
    }

    /// Write every sheet as xlsx to `path`.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        if !self.is_modified() {
            log::info!("No changes to save.");
            return Ok(());
        }

        let mut workbook = XlsxWorkbook::new();

        let number_format = Format::new().set_num_format("General");
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;

            for col in 0..sheet.max_cols {
                worksheet.set_column_width(col as u16, 15)?;
            }

            if sheet.frozen_rows > 0 {
                worksheet.set_freeze_panes(sheet.frozen_rows as u32, 0)?;
            }

            for row in 1..=sheet.max_rows {
                for col in 1..=sheet.max_cols {
                    let cell = sheet.cell(row, col);

                    let row_idx = (row - 1) as u32;
                    let col_idx = (col - 1) as u16;

                    match (cell.cell_type(), cell) {
                        (CellType::Empty, _) => {}
                        (_, CellValue::Int(i)) => {
                            worksheet.write_number_with_format(
                                row_idx,
                                col_idx,
                                *i as f64,
                                &number_format,
                            )?;
                        }
                        (_, CellValue::Float(f)) => {
                            worksheet.write_number_with_format(
                                row_idx,
                                col_idx,
                                *f,
                                &number_format,
                            )?;
                        }
                        (_, CellValue::DateTime(dt)) => {
                            worksheet.write_number_with_format(
                                row_idx,
                                col_idx,
                                *dt,
                                &date_format,
                            )?;
                        }
                        (_, CellValue::Bool(b)) => {
                            worksheet.write_boolean(row_idx, col_idx, *b)?;
                        }
                        (_, CellValue::Error(e)) => {
                            // Stored as a formula that evaluates to the same error
                            worksheet.write_formula(
                                row_idx,
                                col_idx,
                                Formula::new(format!("={}", e)).set_result(e.as_str()),
                            )?;
                        }
                        (_, value) if value.is_formula() => {
                            worksheet.write_formula(
                                row_idx,
                                col_idx,
                                Formula::new(value.to_string()),
                            )?;
                        }
                        (_, value) => {
                            worksheet.write_string(row_idx, col_idx, value.to_string())?;
                        }
                    }
                }
            }
        }

        workbook
            .save(path)
            .with_context(|| format!("Failed to save workbook: {}", path.display()))?;
        self.is_modified = false;

        log::info!("Saved workbook to {}", path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn error_cells_are_not_saved_as_prose() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("errors.xlsx");

        let sheet = Sheet::from_rows(
            "Data",
            vec![
                vec!["id".into(), "ratio".into()],
                vec![1.into(), CellValue::Error("#DIV/0!".to_string())],
            ],
        );
        let mut workbook = Workbook {
            sheets: vec![sheet],
            file_path: path.clone(),
            is_modified: true,
        };
        workbook.save_to(&path).unwrap();

        let mut reopened = open_workbook(&path).unwrap();
        let cell = reopened.sheet_mut(None).unwrap().cell(2, 2).clone();
        assert!(
            matches!(
                &cell,
                CellValue::Error(e) | CellValue::String(e) if e == "#DIV/0!"
            ),
            "unexpected cell {:?}",
            cell
        );
    }
}
