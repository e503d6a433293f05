use std::fmt;

use crate::utils::cell_reference;

/// Rectangular selector over sheet cells. All coordinates are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub row: usize,
    pub column: usize,
    pub height: usize,
    pub width: usize,
}

impl Range {
    pub fn new(row: usize, column: usize, height: usize, width: usize) -> Self {
        Self {
            row,
            column,
            height,
            width,
        }
    }

    /// Last row covered by the range. Equals `row - 1` for an empty range and
    /// saturates instead of wrapping.
    pub fn end_row(&self) -> usize {
        self.row.saturating_add(self.height).saturating_sub(1)
    }

    pub fn end_column(&self) -> usize {
        self.column.saturating_add(self.width).saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{}:<empty>", cell_reference((self.row, self.column)));
        }
        write!(
            f,
            "{}:{}",
            cell_reference((self.row, self.column)),
            cell_reference((self.end_row(), self.end_column()))
        )
    }
}
