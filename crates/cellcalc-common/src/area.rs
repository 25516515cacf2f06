#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular block of cells, 1-based and inclusive on both ends.
///
/// `sheet` is `None` for the formula's own sheet.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AreaAddress {
    pub sheet: Option<String>,
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl AreaAddress {
    pub fn new(
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
    ) -> Result<Self, &'static str> {
        if first_row == 0 || first_col == 0 || last_row == 0 || last_col == 0 {
            return Err("Row and column indices must be 1-based");
        }
        if first_row > last_row || first_col > last_col {
            return Err("Area must be ordered: first <= last");
        }
        Ok(Self {
            sheet: None,
            first_row,
            first_col,
            last_row,
            last_col,
        })
    }

    pub fn cell(row: u32, col: u32) -> Result<Self, &'static str> {
        Self::new(row, col, row, col)
    }

    pub fn on_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Parse `"A1"` or `"A1:C4"` (no sheet prefix, `$` markers ignored).
    pub fn parse_a1(s: &str) -> Result<Self, &'static str> {
        let (start, end) = match s.split_once(':') {
            Some((a, b)) => (a, b),
            None => (s, s),
        };
        let (r1, c1) = parse_a1_cell(start)?;
        let (r2, c2) = parse_a1_cell(end)?;
        Self::new(r1.min(r2), c1.min(c2), r1.max(r2), c1.max(c2))
    }

    /// Zero when the bounds are inverted.
    pub fn width(&self) -> u32 {
        span(self.first_col, self.last_col)
    }

    /// Zero when the bounds are inverted.
    pub fn height(&self) -> u32 {
        span(self.first_row, self.last_row)
    }

    pub fn is_single_cell(&self) -> bool {
        self.width() == 1 && self.height() == 1
    }

    pub fn is_column(&self) -> bool {
        self.width() == 1
    }

    pub fn is_row(&self) -> bool {
        self.height() == 1
    }

    pub fn contains_row(&self, row: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
    }

    pub fn contains_col(&self, col: u32) -> bool {
        (self.first_col..=self.last_col).contains(&col)
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.contains_row(row) && self.contains_col(col)
    }
}

fn span(first: u32, last: u32) -> u32 {
    last.checked_sub(first).map_or(0, |d| d.saturating_add(1))
}

/// `"B3"` -> `(3, 2)`.
pub fn parse_a1_cell(s: &str) -> Result<(u32, u32), &'static str> {
    let s = s.trim().trim_start_matches('$');
    let split = s
        .find(|c: char| c.is_ascii_digit() || c == '$')
        .ok_or("Missing row number")?;
    let (letters, digits) = s.split_at(split);
    let digits = digits.trim_start_matches('$');
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("Invalid column letters");
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        let v = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(v))
            .ok_or("Column out of range")?;
    }
    let row: u32 = digits.parse().map_err(|_| "Invalid row number")?;
    if row == 0 {
        return Err("Row and column indices must be 1-based");
    }
    Ok((row, col))
}
