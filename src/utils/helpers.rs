use anyhow::Result;

use crate::excel::{MAX_COLUMNS, MAX_ROWS};
use crate::table::Range;

#[must_use]
pub fn index_to_col_name(index: usize) -> String {
    let mut col_name = String::new();
    let mut n = index;

    while n > 0 {
        let remainder = (n - 1) % 26;
        col_name.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }

    if col_name.is_empty() {
        col_name.push('A');
    }

    col_name
}

#[must_use]
pub fn col_name_to_index(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }

    let mut result: usize = 0;

    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }

        let val = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        result = result.checked_mul(26)?.checked_add(val)?;
    }

    Some(result)
}

// Format cell reference (e.g., A1, B2)
#[must_use]
pub fn cell_reference(cell: (usize, usize)) -> String {
    format!("{}{}", index_to_col_name(cell.1), cell.0)
}

// Parse "B10" into (row, col)
#[must_use]
pub fn parse_cell_reference(input: &str) -> Option<(usize, usize)> {
    let col_end = input.find(|c: char| c.is_ascii_digit())?;
    if col_end == 0 {
        return None;
    }

    let col = col_name_to_index(&input[..col_end])?;
    let row = input[col_end..].parse::<usize>().ok()?;

    if row == 0 || row > MAX_ROWS || col > MAX_COLUMNS {
        return None;
    }

    Some((row, col))
}

/// Parse an A1-style selector into a [`Range`].
///
/// Accepts cells (`C4`), cell spans (`B3:D7`), single rows (`7`) and row
/// spans (`3:5`). Row-only selectors span `1..=last_column`. Rows and
/// columns past the xlsx sheet limits are rejected.
pub fn parse_range(input: &str, last_column: usize) -> Result<Range> {
    let input = input.trim();
    let (start, end) = input.split_once(':').unwrap_or((input, input));

    if let (Ok(first), Ok(last)) = (start.parse::<usize>(), end.parse::<usize>()) {
        if first == 0 || last == 0 {
            anyhow::bail!("Invalid range '{}': rows start at 1", input);
        }
        if first > MAX_ROWS || last > MAX_ROWS {
            anyhow::bail!(
                "Invalid range '{}': rows stop at {}",
                input,
                MAX_ROWS
            );
        }
        let (top, bottom) = (first.min(last), first.max(last));
        return Ok(Range::new(top, 1, bottom - top + 1, last_column));
    }

    let (Some(a), Some(b)) = (parse_cell_reference(start), parse_cell_reference(end)) else {
        anyhow::bail!(
            "Invalid range '{}': expected A1 notation such as B3:D7 or 3:5",
            input
        );
    };

    let (top, bottom) = (a.0.min(b.0), a.0.max(b.0));
    let (left, right) = (a.1.min(b.1), a.1.max(b.1));

    Ok(Range::new(top, left, bottom - top + 1, right - left + 1))
}
