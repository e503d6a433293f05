use anyhow::Result;

use crate::excel::CellValue;
use crate::table::{Range, SheetAccess};

/// In-memory grid for one worksheet.
///
/// `data` is indexed 1-based: row 0 and column 0 are padding so that
/// `data[row][col]` lines up with spreadsheet coordinates.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub name: String,
    pub data: Vec<Vec<CellValue>>,
    pub max_rows: usize,
    pub max_cols: usize,
    pub frozen_rows: usize,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data: vec![vec![CellValue::Empty; 1]; 1],
            max_rows: 0,
            max_cols: 0,
            frozen_rows: 0,
        }
    }

    /// Build a sheet whose first row lands at row 1.
    pub fn from_rows(name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        let mut sheet = Self::new(name);
        for (row_idx, row) in rows.into_iter().enumerate() {
            for (col_idx, value) in row.into_iter().enumerate() {
                sheet.set_cell(row_idx + 1, col_idx + 1, value);
            }
        }
        sheet.recalculate_bounds();
        sheet
    }

    pub fn with_frozen_rows(mut self, frozen_rows: usize) -> Self {
        self.frozen_rows = frozen_rows;
        self
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    /// Set a cell, growing the grid if needed. Bounds grow only for non-empty values.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        self.ensure_cell_exists(row, col);

        if !value.is_empty() {
            self.max_rows = self.max_rows.max(row);
            self.max_cols = self.max_cols.max(col);
        }
        self.data[row][col] = value;
    }

    pub fn ensure_cell_exists(&mut self, row: usize, col: usize) {
        // Expand rows if needed
        if row >= self.data.len() {
            let default_row_len = self.data[0].len().max(col + 1);
            let rows_to_add = row + 1 - self.data.len();

            self.data
                .extend(vec![vec![CellValue::Empty; default_row_len]; rows_to_add]);
        }

        // Expand columns if needed
        if col >= self.data[row].len() {
            for row_data in &mut self.data {
                if row_data.len() <= col {
                    row_data.resize_with(col + 1, CellValue::default);
                }
            }
        }
    }

    /// Recompute `max_rows`/`max_cols` from the last non-empty cells.
    pub fn recalculate_bounds(&mut self) {
        self.max_rows = self
            .data
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, row)| row.iter().skip(1).any(|cell| !cell.is_empty()))
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        self.max_cols = self
            .data
            .iter()
            .skip(1)
            .map(|row| {
                row.iter()
                    .enumerate()
                    .skip(1)
                    .rev()
                    .find(|(_, cell)| !cell.is_empty())
                    .map(|(idx, _)| idx)
                    .unwrap_or(0)
            })
            .max()
            .unwrap_or(0);
    }

    /// Raw row contents from column 1 through `max_cols`.
    pub fn row_values(&self, row: usize) -> Vec<CellValue> {
        (1..=self.max_cols)
            .map(|col| self.cell(row, col).clone())
            .collect()
    }
}

/// Largest worksheet an xlsx file can hold.
pub const MAX_ROWS: usize = 1_048_576;
pub const MAX_COLUMNS: usize = 16_384;

fn check_bounds(range: &Range) -> Result<()> {
    if range.row == 0 || range.column == 0 {
        anyhow::bail!(
            "Range origin ({}, {}) is out of bounds: rows and columns start at 1",
            range.row,
            range.column
        );
    }
    if range.end_row() > MAX_ROWS || range.end_column() > MAX_COLUMNS {
        anyhow::bail!(
            "Range {} extends past the sheet limit of {} rows and {} columns",
            range,
            MAX_ROWS,
            MAX_COLUMNS
        );
    }
    Ok(())
}

impl SheetAccess for Sheet {
    fn frozen_rows(&self) -> usize {
        self.frozen_rows
    }

    fn last_row(&self) -> usize {
        self.max_rows
    }

    fn last_column(&self) -> usize {
        self.max_cols
    }

    fn values(&self, range: &Range) -> Result<Vec<Vec<CellValue>>> {
        check_bounds(range)?;

        let rows = (range.row..range.row + range.height)
            .map(|row| {
                (range.column..range.column + range.width)
                    .map(|col| self.cell(row, col).clone())
                    .collect()
            })
            .collect();

        Ok(rows)
    }

    fn set_values(&mut self, range: &Range, values: Vec<Vec<CellValue>>) -> Result<()> {
        check_bounds(range)?;

        if values.len() != range.height || values.iter().any(|row| row.len() != range.width) {
            anyhow::bail!(
                "Data does not match range dimensions: expected {} rows of {} columns",
                range.height,
                range.width
            );
        }

        for (row_offset, row) in values.into_iter().enumerate() {
            for (col_offset, value) in row.into_iter().enumerate() {
                self.set_cell(range.row + row_offset, range.column + col_offset, value);
            }
        }

        // Blanking cells at the edge can shrink the used area
        self.recalculate_bounds();

        Ok(())
    }

    fn append_row(&mut self, row: Vec<CellValue>) -> Result<usize> {
        let row_index = self.max_rows + 1;
        if row_index > MAX_ROWS {
            anyhow::bail!("Sheet is full: cannot append past row {}", MAX_ROWS);
        }

        // Clear leftovers from cells that were blanked but never removed
        self.ensure_cell_exists(row_index, row.len().max(1));
        for cell in self.data[row_index].iter_mut() {
            *cell = CellValue::Empty;
        }

        for (col_offset, value) in row.into_iter().enumerate() {
            self.set_cell(row_index, col_offset + 1, value);
        }

        // An appended row is used even when every cell is blank
        self.max_rows = row_index;

        Ok(row_index)
    }

    fn delete_rows(&mut self, row: usize, count: usize) -> Result<()> {
        if row == 0 {
            anyhow::bail!("Row index 0 is out of bounds: rows start at 1");
        }

        let end = row.saturating_add(count).min(self.data.len());
        if row < end {
            self.data.drain(row..end);
        }

        self.recalculate_bounds();

        Ok(())
    }
}
