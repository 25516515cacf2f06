//! cellcalc-eval – reference model and call context (object-safe)
//!
//! Arguments reach a function as [`CalcValue`]s: either an already-resolved
//! scalar, or a lazily-read [`AreaRef`] / list of areas backed by a
//! [`CellResolver`] supplied by the host workbook.

use std::fmt::{self, Debug};

use cellcalc_common::{AreaAddress, ExcelError, LiteralValue};

use crate::config::EvalConfig;

/* ───────────────────────────── Resolver ───────────────────────────── */

/// The host's "get value at coordinate" capability.
///
/// Coordinates are 1-based. Unset cells should resolve to
/// `LiteralValue::Empty`; an `Err` is surfaced to functions as an
/// error-valued cell.
pub trait CellResolver: Send + Sync {
    fn resolve_cell(
        &self,
        sheet: Option<&str>,
        row: u32,
        col: u32,
    ) -> Result<LiteralValue, ExcelError>;
}

/* ───────────────────────────── AreaRef ────────────────────────────── */

/// A rectangular reference whose cells are read on demand.
#[derive(Clone)]
pub struct AreaRef<'a> {
    address: AreaAddress,
    resolver: &'a dyn CellResolver,
}

impl Debug for AreaRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AreaRef")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl<'a> AreaRef<'a> {
    pub fn new(address: AreaAddress, resolver: &'a dyn CellResolver) -> Self {
        Self { address, resolver }
    }

    pub fn address(&self) -> &AreaAddress {
        &self.address
    }

    /// `(rows, cols)`.
    pub fn dims(&self) -> (u32, u32) {
        (self.address.height(), self.address.width())
    }

    pub fn first_row(&self) -> u32 {
        self.address.first_row
    }

    pub fn first_col(&self) -> u32 {
        self.address.first_col
    }

    /// Cell at sheet coordinates; `#REF!` outside the area.
    pub fn get_absolute(&self, row: u32, col: u32) -> LiteralValue {
        if !self.address.contains(row, col) {
            return LiteralValue::Error(
                ExcelError::new_ref()
                    .with_message(format!("R{row}C{col} lies outside the referenced area")),
            );
        }
        self.resolver
            .resolve_cell(self.address.sheet.as_deref(), row, col)
            .unwrap_or_else(LiteralValue::Error)
    }

    /// Cell at 0-based offsets from the top-left corner.
    pub fn get_relative(&self, row_offset: u32, col_offset: u32) -> LiteralValue {
        self.get_absolute(
            self.address.first_row.saturating_add(row_offset),
            self.address.first_col.saturating_add(col_offset),
        )
    }

    /// Same top-left corner and sheet, `rows` x `cols` cells. `None` when the
    /// new corner would overflow.
    pub fn resized(&self, rows: u32, cols: u32) -> Option<AreaRef<'a>> {
        let a = &self.address;
        let last_row = a.first_row.checked_add(rows.checked_sub(1)?)?;
        let last_col = a.first_col.checked_add(cols.checked_sub(1)?)?;
        let mut address = AreaAddress::new(a.first_row, a.first_col, last_row, last_col).ok()?;
        address.sheet = a.sheet.clone();
        Some(AreaRef::new(address, self.resolver))
    }

    /// Every cell in row-major order as `(row, col, value)` (absolute coords).
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, LiteralValue)> + '_ {
        let a = &self.address;
        (a.first_row..=a.last_row).flat_map(move |r| {
            (a.first_col..=a.last_col).map(move |c| (r, c, self.get_absolute(r, c)))
        })
    }
}

/* ───────────────────────────── CalcValue ──────────────────────────── */

/// An evaluated function argument.
#[derive(Debug, Clone)]
pub enum CalcValue<'a> {
    Scalar(LiteralValue),
    Area(AreaRef<'a>),
    /// Discontiguous selection, e.g. `(A1:A3,C1:C3)`.
    List(Vec<AreaRef<'a>>),
}

impl From<LiteralValue> for CalcValue<'_> {
    fn from(v: LiteralValue) -> Self {
        CalcValue::Scalar(v)
    }
}

impl<'a> From<AreaRef<'a>> for CalcValue<'a> {
    fn from(a: AreaRef<'a>) -> Self {
        CalcValue::Area(a)
    }
}

impl<'a> CalcValue<'a> {
    /// The area behind an `Area` or a singleton `List`.
    pub fn as_single_area(&self) -> Option<&AreaRef<'a>> {
        match self {
            CalcValue::Area(a) => Some(a),
            CalcValue::List(list) if list.len() == 1 => list.first(),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CalcValue::Scalar(LiteralValue::Missing))
    }
}

/* ─────────────────────────── FunctionContext ──────────────────────── */

/// Per-call context: the formula cell's own coordinates (1-based) and the
/// evaluation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionContext {
    pub row: u32,
    pub col: u32,
    pub config: EvalConfig,
}

impl FunctionContext {
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            config: EvalConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }
}
