use std::fmt;

use thiserror::Error;

use crate::table::{Range, Record};

/// Errors that stop a table operation outright.
///
/// Malformed rows and rejected deletes are not errors; they come back as
/// [`RowOutcome::Skipped`] and [`DeleteOutcome::OutOfRange`].
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Sheet has no columns, so there is no header row to read")]
    NoColumns,

    #[error(transparent)]
    Sheet(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;

/// Why a raw row did not become a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowSkip {
    LengthMismatch {
        row_index: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for RowSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSkip::LengthMismatch {
                row_index,
                expected,
                found,
            } => write!(
                f,
                "Row {} has {} cells but there are {} headers",
                row_index, found, expected
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RowOutcome {
    Read(Record),
    Skipped(RowSkip),
}

/// Result of reading a block of rows: one outcome per row, in sheet order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordBatch {
    outcomes: Vec<RowOutcome>,
}

impl RecordBatch {
    pub fn new(outcomes: Vec<RowOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RowOutcome::Read(record) => Some(record),
            RowOutcome::Skipped(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &RowSkip> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RowOutcome::Skipped(skip) => Some(skip),
            RowOutcome::Read(_) => None,
        })
    }

    pub fn into_records(self) -> Vec<Record> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                RowOutcome::Read(record) => Some(record),
                RowOutcome::Skipped(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted {
        row: usize,
        count: usize,
    },
    /// Nothing was deleted because the range touches header rows or runs past the last row.
    OutOfRange {
        range: Range,
        first_record_row: usize,
        last_row: usize,
    },
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }
}
