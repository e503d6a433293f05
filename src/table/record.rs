use indexmap::IndexMap;

use crate::excel::CellValue;

/// Header-keyed view of one data row.
///
/// Records read from a sheet carry the absolute row they came from; records
/// built by hand for [`Table::add_records`](crate::table::Table::add_records)
/// have no row index until they are written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    row_index: Option<usize>,
    fields: IndexMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_row(row_index: usize) -> Self {
        Self {
            row_index: Some(row_index),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, header: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(header.into(), value.into());
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.fields.get(header)
    }

    pub fn row_index(&self) -> Option<usize> {
        self.row_index
    }

    pub fn set_row_index(&mut self, row_index: Option<usize>) {
        self.row_index = row_index;
    }

    pub fn fields(&self) -> &IndexMap<String, CellValue> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
