mod access;
mod outcome;
mod range;
mod record;

use log::{debug, warn};

use crate::excel::CellValue;

pub use access::SheetAccess;
pub use outcome::{DeleteOutcome, RecordBatch, Result, RowOutcome, RowSkip, TableError};
pub use range::Range;
pub use record::Record;

/// What to write for a header the record has no field for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingField {
    /// Write an empty cell.
    #[default]
    Blank,
    /// Leave the existing cell alone. Appended rows have nothing to keep, so they get blanks.
    Keep,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub missing_field: MissingField,
}

/// Records view over one sheet.
///
/// The header row is the last frozen row, or row 1 when nothing is frozen.
/// Every row below it is a record keyed by header name. Headers are read once
/// when the table is built; call [`Table::refresh_headers`] after the header
/// row changes underneath.
pub struct Table<S: SheetAccess> {
    sheet: S,
    headers: Vec<String>,
    options: TableOptions,
}

impl<S: SheetAccess> Table<S> {
    pub fn new(sheet: S) -> Result<Self> {
        Self::with_options(sheet, TableOptions::default())
    }

    pub fn with_options(sheet: S, options: TableOptions) -> Result<Self> {
        let mut table = Self {
            sheet,
            headers: Vec::new(),
            options,
        };
        table.refresh_headers()?;
        Ok(table)
    }

    /// Re-read the header row from the sheet.
    pub fn refresh_headers(&mut self) -> Result<()> {
        let last_column = self.sheet.last_column();
        if last_column == 0 {
            return Err(TableError::NoColumns);
        }

        let range = Range::new(self.header_row(), 1, 1, last_column);
        let mut values = self.sheet.values(&range)?;
        let header_cells = if values.is_empty() {
            Vec::new()
        } else {
            values.swap_remove(0)
        };

        self.headers = header_cells.iter().map(CellValue::to_string).collect();
        debug!("Read {} headers from row {}", self.headers.len(), range.row);

        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn sheet(&self) -> &S {
        &self.sheet
    }

    fn header_row(&self) -> usize {
        self.sheet.frozen_rows().max(1)
    }

    /// 1-based column of `header`, or `None` when no header has that name.
    pub fn column_for_header(&self, header: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|index| index + 1)
    }

    /// Row of the first record, directly below the header row.
    pub fn first_record_index(&self) -> usize {
        self.header_row() + 1
    }

    /// Whether every row of `range` is an existing record row.
    pub fn within_record_range(&self, range: &Range) -> bool {
        range.row >= self.first_record_index() && range.end_row() <= self.sheet.last_row()
    }

    /// Full-width range over the rows of `range`, moved down past the header rows if needed.
    pub fn convert_range_to_row_range(&self, range: &Range) -> Range {
        let start_row = range.row.max(self.first_record_index());
        Range::new(start_row, 1, range.height, self.sheet.last_column())
    }

    /// Full-width range of `num_rows` rows starting at `row_index`. No header protection.
    pub fn range_for_rows(&self, row_index: usize, num_rows: usize) -> Range {
        Range::new(row_index, 1, num_rows, self.sheet.last_column())
    }

    pub fn make_record(
        &self,
        raw_row: &[CellValue],
        row_index: usize,
    ) -> std::result::Result<Record, RowSkip> {
        if raw_row.len() != self.headers.len() {
            let skip = RowSkip::LengthMismatch {
                row_index,
                expected: self.headers.len(),
                found: raw_row.len(),
            };
            warn!("{}", skip);
            return Err(skip);
        }

        let mut record = Record::at_row(row_index);
        for (header, value) in self.headers.iter().zip(raw_row) {
            if !header.is_empty() {
                record.insert(header.as_str(), value.clone());
            }
        }

        Ok(record)
    }

    /// Records for the rows of `range`. Header rows are never included.
    pub fn records(&self, range: &Range) -> Result<RecordBatch> {
        let row_range = self.convert_range_to_row_range(range);
        if row_range.is_empty() {
            return Ok(RecordBatch::default());
        }

        let values = self.sheet.values(&row_range)?;
        debug!("Read {} rows from {}", values.len(), row_range);

        let outcomes = values
            .iter()
            .enumerate()
            .map(|(offset, raw_row)| {
                let row_index = row_range.row + offset;
                match self.make_record(raw_row, row_index) {
                    Ok(record) => RowOutcome::Read(record),
                    Err(skip) => {
                        warn!("Ignoring row {}", row_index);
                        RowOutcome::Skipped(skip)
                    }
                }
            })
            .collect();

        Ok(RecordBatch::new(outcomes))
    }

    pub fn all_records(&self) -> Result<RecordBatch> {
        let first = self.first_record_index();
        let last = self.sheet.last_row();
        if last < first {
            return Ok(RecordBatch::default());
        }

        self.records(&self.range_for_rows(first, last - first + 1))
    }

    /// Append one row per record, in order. Returns the rows written.
    pub fn add_records(&mut self, records: &[Record]) -> Result<Vec<usize>> {
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            let raw_row = self
                .headers
                .iter()
                .map(|header| record.get(header).cloned().unwrap_or_default())
                .collect();
            let row_index = self.sheet.append_row(raw_row)?;
            debug!("Appended record at row {}", row_index);
            rows.push(row_index);
        }

        Ok(rows)
    }

    /// Delete the rows of `range` if they are all record rows; otherwise do nothing.
    pub fn delete_records(&mut self, range: &Range) -> Result<DeleteOutcome> {
        if !self.within_record_range(range) {
            warn!("Row {} not in range", range.row);
            return Ok(DeleteOutcome::OutOfRange {
                range: *range,
                first_record_row: self.first_record_index(),
                last_row: self.sheet.last_row(),
            });
        }

        self.sheet.delete_rows(range.row, range.height)?;
        debug!("Deleted {} rows starting at row {}", range.height, range.row);

        Ok(DeleteOutcome::Deleted {
            row: range.row,
            count: range.height,
        })
    }

    /// Overwrite the row at `row_index` with `record`, one cell per header.
    pub fn update_record(&mut self, row_index: usize, record: &Record) -> Result<()> {
        let range = Range::new(row_index, 1, 1, self.headers.len());

        let existing = match self.options.missing_field {
            MissingField::Keep => self.sheet.values(&range)?.into_iter().next(),
            MissingField::Blank => None,
        };

        let raw_row = self
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| match record.get(header) {
                Some(value) => value.clone(),
                None => existing
                    .as_ref()
                    .and_then(|row| row.get(col).cloned())
                    .unwrap_or_default(),
            })
            .collect();

        self.sheet.set_values(&range, vec![raw_row])?;
        debug!("Updated record at row {}", row_index);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::Sheet;
    use pretty_assertions::assert_eq;

    fn people() -> Sheet {
        Sheet::from_rows(
            "People",
            vec![
                vec!["id".into(), "name".into()],
                vec![1.into(), "A".into()],
                vec![2.into(), "B".into()],
            ],
        )
        .with_frozen_rows(1)
    }

    #[test]
    fn reads_headers_from_last_frozen_row() {
        let sheet = Sheet::from_rows(
            "Report",
            vec![
                vec!["Quarterly report".into()],
                vec!["region".into(), "total".into()],
                vec!["north".into(), 10.into()],
            ],
        )
        .with_frozen_rows(2);
        let table = Table::new(sheet).unwrap();

        assert_eq!(table.headers(), &["region", "total"]);
        assert_eq!(table.first_record_index(), 3);
    }

    #[test]
    fn first_record_index_defaults_to_row_two() {
        let table = Table::new(people().with_frozen_rows(0)).unwrap();
        assert_eq!(table.first_record_index(), 2);
    }

    #[test]
    fn empty_sheet_is_rejected() {
        let err = Table::new(Sheet::new("Empty")).err().unwrap();
        assert!(matches!(err, TableError::NoColumns));
    }

    #[test]
    fn column_for_header_includes_first_column() {
        let table = Table::new(people()).unwrap();
        assert_eq!(table.column_for_header("id"), Some(1));
        assert_eq!(table.column_for_header("name"), Some(2));
        assert_eq!(table.column_for_header("missing"), None);
    }

    #[test]
    fn convert_range_clamps_start_and_spans_all_columns() {
        let table = Table::new(people()).unwrap();
        assert_eq!(
            table.convert_range_to_row_range(&Range::new(1, 2, 2, 1)),
            Range::new(2, 1, 2, 2)
        );
        assert_eq!(
            table.convert_range_to_row_range(&Range::new(3, 2, 1, 1)),
            Range::new(3, 1, 1, 2)
        );
    }

    #[test]
    fn range_for_rows_does_not_clamp() {
        let table = Table::new(people()).unwrap();
        assert_eq!(table.range_for_rows(1, 3), Range::new(1, 1, 3, 2));
    }

    #[test]
    fn within_record_range_guards_header_and_tail() {
        let table = Table::new(people()).unwrap();
        assert!(table.within_record_range(&Range::new(2, 1, 2, 1)));
        assert!(!table.within_record_range(&Range::new(1, 1, 1, 1)));
        assert!(!table.within_record_range(&Range::new(3, 1, 2, 1)));
    }

    #[test]
    fn within_record_range_handles_empty_and_huge_spans() {
        let table = Table::new(people()).unwrap();
        // An empty span ends on the row before it starts
        assert!(table.within_record_range(&Range::new(2, 1, 0, 1)));
        assert!(table.within_record_range(&Range::new(4, 1, 0, 1)));
        assert!(!table.within_record_range(&Range::new(5, 1, 0, 1)));
        assert!(!table.within_record_range(&Range::new(4, 1, 1, 1)));
        assert!(!table.within_record_range(&Range::new(2, 1, usize::MAX - 1, 2)));
        assert!(!table.within_record_range(&Range::new(usize::MAX, 1, usize::MAX, 2)));
    }

    #[test]
    fn make_record_skips_empty_headers() {
        let sheet = Sheet::from_rows(
            "Gaps",
            vec![
                vec!["id".into(), CellValue::Empty, "name".into()],
                vec![1.into(), "note".into(), "A".into()],
            ],
        );
        let table = Table::new(sheet).unwrap();
        let raw = [CellValue::Int(1), CellValue::text("note"), CellValue::text("A")];

        let record = table.make_record(&raw, 2).unwrap();
        assert_eq!(record.row_index(), Some(2));
        assert_eq!(record.headers().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn make_record_rejects_length_mismatch() {
        let table = Table::new(people()).unwrap();
        let skip = table.make_record(&[CellValue::Int(1)], 5).unwrap_err();
        assert_eq!(
            skip,
            RowSkip::LengthMismatch {
                row_index: 5,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn records_from_clamped_range_are_labelled_with_rows_read() {
        let table = Table::new(people()).unwrap();
        let batch = table.records(&Range::new(1, 1, 2, 2)).unwrap();
        let rows: Vec<_> = batch.records().map(|r| r.row_index()).collect();
        assert_eq!(rows, vec![Some(2), Some(3)]);
    }

    #[test]
    fn all_records_on_header_only_sheet_is_empty() {
        let sheet = Sheet::from_rows("H", vec![vec!["id".into(), "name".into()]]);
        let table = Table::new(sheet).unwrap();
        assert!(table.all_records().unwrap().is_empty());
    }

    #[test]
    fn add_then_read_back() {
        let mut table = Table::new(people()).unwrap();
        let rows = table
            .add_records(&[Record::new().with("name", "C").with("id", 3)])
            .unwrap();
        assert_eq!(rows, vec![4]);

        let batch = table.records(&Range::new(4, 1, 1, 1)).unwrap();
        let record = batch.records().next().unwrap();
        assert_eq!(record.get("id"), Some(&CellValue::Int(3)));
        assert_eq!(record.get("name"), Some(&CellValue::text("C")));
    }

    #[test]
    fn add_records_blanks_missing_fields() {
        let mut table = Table::new(people()).unwrap();
        table
            .add_records(&[Record::new().with("name", "C").with("unknown", 9)])
            .unwrap();
        assert_eq!(
            table.sheet().row_values(4),
            vec![CellValue::Empty, CellValue::text("C")]
        );
    }

    #[test]
    fn blank_records_still_get_their_own_row() {
        let mut table = Table::new(people()).unwrap();
        let rows = table
            .add_records(&[
                Record::new().with("unknown", 1),
                Record::new().with("id", 9).with("name", "Z"),
            ])
            .unwrap();

        assert_eq!(rows, vec![4, 5]);
        assert_eq!(table.sheet().last_row(), 5);
        assert_eq!(
            table.sheet().row_values(5),
            vec![CellValue::Int(9), CellValue::text("Z")]
        );
    }

    #[test]
    fn delete_of_header_row_is_a_noop() {
        let mut table = Table::new(people()).unwrap();
        let outcome = table.delete_records(&Range::new(1, 1, 1, 2)).unwrap();
        assert!(!outcome.is_deleted());
        assert_eq!(table.sheet().last_row(), 3);
    }

    #[test]
    fn delete_removes_record_rows() {
        let mut table = Table::new(people()).unwrap();
        let outcome = table.delete_records(&Range::new(2, 1, 1, 2)).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { row: 2, count: 1 });

        let names: Vec<_> = table
            .all_records()
            .unwrap()
            .into_records()
            .into_iter()
            .map(|r| r.get("name").cloned())
            .collect();
        assert_eq!(names, vec![Some(CellValue::text("B"))]);
    }

    #[test]
    fn huge_spans_are_refused_without_touching_the_sheet() {
        let mut table = Table::new(people()).unwrap();
        let huge = Range::new(2, 1, usize::MAX - 1, 2);

        let outcome = table.delete_records(&huge).unwrap();
        assert!(!outcome.is_deleted());
        assert_eq!(table.sheet().last_row(), 3);

        let err = table.records(&huge).unwrap_err();
        assert!(matches!(err, TableError::Sheet(_)));
        assert_eq!(table.all_records().unwrap().len(), 2);
    }

    #[test]
    fn update_touches_only_one_row() {
        let mut table = Table::new(people()).unwrap();
        table
            .update_record(2, &Record::new().with("id", 1).with("name", "Z"))
            .unwrap();

        assert_eq!(
            table.sheet().row_values(2),
            vec![CellValue::Int(1), CellValue::text("Z")]
        );
        assert_eq!(
            table.sheet().row_values(3),
            vec![CellValue::Int(2), CellValue::text("B")]
        );
    }

    #[test]
    fn update_with_keep_preserves_missing_fields() {
        let options = TableOptions {
            missing_field: MissingField::Keep,
        };
        let mut table = Table::with_options(people(), options).unwrap();
        table
            .update_record(3, &Record::new().with("name", "Q"))
            .unwrap();
        assert_eq!(
            table.sheet().row_values(3),
            vec![CellValue::Int(2), CellValue::text("Q")]
        );

        let mut blanking = Table::new(people()).unwrap();
        blanking
            .update_record(3, &Record::new().with("name", "Q"))
            .unwrap();
        assert_eq!(
            blanking.sheet().row_values(3),
            vec![CellValue::Empty, CellValue::text("Q")]
        );
    }

    #[test]
    fn refresh_headers_picks_up_renamed_columns() {
        let mut sheet = people();
        let mut table = Table::new(&mut sheet).unwrap();
        table
            .sheet
            .set_values(
                &Range::new(1, 1, 1, 2),
                vec![vec!["key".into(), "label".into()]],
            )
            .unwrap();
        assert_eq!(table.headers(), &["id", "name"]);

        table.refresh_headers().unwrap();
        assert_eq!(table.headers(), &["key", "label"]);
    }
}
