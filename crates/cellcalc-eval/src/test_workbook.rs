//! crates/cellcalc-eval/src/test_workbook.rs
//! -----------------------------------------
//! Lightweight in-memory workbook for unit/prop tests and benches.
use std::collections::HashMap;

use crate::traits::{AreaRef, CellResolver};
use cellcalc_common::{AreaAddress, ExcelError, LiteralValue, parse_a1_cell};

type V = LiteralValue;
type CellKey = (u32, u32); // 1-based (row, col)

const DEFAULT_SHEET: &str = "Sheet1";

#[derive(Default, Clone, Debug)]
struct Sheet {
    cells: HashMap<CellKey, V>,
}

#[derive(Default, Clone, Debug)]
pub struct TestWorkbook {
    sheets: HashMap<String, Sheet>,
}

impl TestWorkbook {
    /* ─────────────── constructors ─────────────── */
    pub fn new() -> Self {
        Self::default()
    }

    /* ─────────────── cell helpers ─────────────── */
    pub fn with_cell<S: Into<String>>(mut self, sheet: S, row: u32, col: u32, v: V) -> Self {
        let sh = self.sheets.entry(sheet.into()).or_default();
        sh.cells.insert((row, col), v);
        self
    }

    pub fn with_cell_a1<S: Into<String>, A: AsRef<str>>(self, sheet: S, a1: A, v: V) -> Self {
        let (row, col) = parse_a1_cell(a1.as_ref()).expect("bad A1 ref in with_cell_a1");
        self.with_cell(sheet, row, col, v)
    }

    /// Writes `data` row by row with its top-left corner at `(row, col)`.
    pub fn with_range<S: Into<String>>(
        mut self,
        sheet: S,
        row: u32,
        col: u32,
        data: Vec<Vec<V>>,
    ) -> Self {
        let sh = self.sheets.entry(sheet.into()).or_default();
        for (r_off, r) in data.into_iter().enumerate() {
            for (c_off, v) in r.into_iter().enumerate() {
                sh.cells.insert((row + r_off as u32, col + c_off as u32), v);
            }
        }
        self
    }

    /* ─────────────── references ─────────────── */
    pub fn area(&self, address: AreaAddress) -> AreaRef<'_> {
        AreaRef::new(address, self)
    }

    /// `wb.area_a1("A1:C4")` on the default sheet.
    pub fn area_a1(&self, a1: &str) -> AreaRef<'_> {
        let address = AreaAddress::parse_a1(a1).expect("bad A1 area in area_a1");
        self.area(address)
    }
}

/* ─────────────────────── trait impls ─────────────────────── */
impl CellResolver for TestWorkbook {
    fn resolve_cell(&self, sheet: Option<&str>, row: u32, col: u32) -> Result<V, ExcelError> {
        let sheet_name = sheet.unwrap_or(DEFAULT_SHEET);
        match self.sheets.get(sheet_name) {
            Some(sh) => Ok(sh.cells.get(&(row, col)).cloned().unwrap_or(V::Empty)),
            None if sheet_name == DEFAULT_SHEET => Ok(V::Empty),
            None => Err(ExcelError::new_ref().with_message(format!("Unknown sheet '{sheet_name}'"))),
        }
    }
}
