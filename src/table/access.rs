use anyhow::Result;

use crate::excel::CellValue;
use crate::table::Range;

/// The sheet primitives a [`Table`](crate::table::Table) is built on.
///
/// Rows and columns are 1-based. `last_row`/`last_column` report the extent of
/// the used area, `0` for an empty sheet.
pub trait SheetAccess {
    fn frozen_rows(&self) -> usize;

    fn last_row(&self) -> usize;

    fn last_column(&self) -> usize;

    /// Read every cell in `range`, row-major. Cells past the used area read as empty.
    fn values(&self, range: &Range) -> Result<Vec<Vec<CellValue>>>;

    /// Overwrite `range`; `values` must have exactly `height` rows of `width` cells.
    fn set_values(&mut self, range: &Range, values: Vec<Vec<CellValue>>) -> Result<()>;

    /// Write `row` just below the last used row and return its row index.
    fn append_row(&mut self, row: Vec<CellValue>) -> Result<usize>;

    /// Remove `count` rows starting at `row`; later rows move up.
    fn delete_rows(&mut self, row: usize, count: usize) -> Result<()>;
}

impl<T: SheetAccess + ?Sized> SheetAccess for &mut T {
    fn frozen_rows(&self) -> usize {
        (**self).frozen_rows()
    }

    fn last_row(&self) -> usize {
        (**self).last_row()
    }

    fn last_column(&self) -> usize {
        (**self).last_column()
    }

    fn values(&self, range: &Range) -> Result<Vec<Vec<CellValue>>> {
        (**self).values(range)
    }

    fn set_values(&mut self, range: &Range, values: Vec<Vec<CellValue>>) -> Result<()> {
        (**self).set_values(range, values)
    }

    fn append_row(&mut self, row: Vec<CellValue>) -> Result<usize> {
        (**self).append_row(row)
    }

    fn delete_rows(&mut self, row: usize, count: usize) -> Result<()> {
        (**self).delete_rows(row, count)
    }
}
