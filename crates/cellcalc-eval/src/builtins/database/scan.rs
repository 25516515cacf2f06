//! The conditional database-scan engine shared by every D-function.
//!
//! A database is an area whose first row holds column headers; each later
//! row is a record. The criteria area has the same shape: a header row,
//! then rows of predicates. Rows are OR'd, columns within a row AND'd.

use cellcalc_common::{ExcelError, LiteralValue};

use crate::args::{CriteriaPredicate, parse_criteria};
use crate::builtins::utils::{criteria_match, eq_ignore_case};
use crate::coercion::coerce_to_text;
use crate::config::{EvalConfig, WildcardPolicy};
use crate::traits::AreaRef;

/// Per-call fold over the selected field of matching records.
///
/// Instances are never shared between scans; the engine calls `reset`
/// before visiting the first record.
pub trait DatabaseAccumulator {
    fn reset(&mut self);

    /// Returns `false` to stop the scan early.
    fn process_match(&mut self, value: &LiteralValue) -> bool;

    fn result(&self) -> LiteralValue;

    /// When `false`, matching records whose field cell is blank are skipped.
    fn allow_empty_match_field(&self) -> bool {
        false
    }

    /// When `true`, the field selector is not resolved and every matching
    /// record is offered as a blank.
    fn counts_records(&self) -> bool {
        false
    }
}

/// One criteria row: `(database column, predicate)` pairs, all of which must
/// hold. `None` marks a predicate under a header naming no database column.
type CriteriaRow = Vec<(Option<u32>, CriteriaPredicate)>;

/// Apply `criteria` to `database` and fold the `field` column of matching
/// records through `acc`.
pub fn run_database_scan(
    database: &AreaRef<'_>,
    field: &LiteralValue,
    criteria: &AreaRef<'_>,
    acc: &mut dyn DatabaseAccumulator,
    config: &EvalConfig,
) -> LiteralValue {
    match scan(database, field, criteria, acc, config) {
        Ok(v) => v,
        Err(e) => LiteralValue::Error(e),
    }
}

fn scan(
    database: &AreaRef<'_>,
    field: &LiteralValue,
    criteria: &AreaRef<'_>,
    acc: &mut dyn DatabaseAccumulator,
    config: &EvalConfig,
) -> Result<LiteralValue, ExcelError> {
    let (db_rows, db_cols) = database.dims();
    let headers: Vec<LiteralValue> = (0..db_cols).map(|c| database.get_relative(0, c)).collect();

    let field_col = if acc.counts_records()
        && matches!(field, LiteralValue::Missing | LiteralValue::Empty)
    {
        None
    } else {
        Some(resolve_field_index(field, &headers)?)
    };
    let criteria_rows = parse_criteria_area(criteria, &headers, config.wildcard_policy)?;

    acc.reset();
    let mut visited = 0u32;
    let mut matched = 0u32;
    for r in 1..db_rows {
        visited += 1;
        if !row_matches_criteria(database, r, &criteria_rows) {
            continue;
        }
        let value = match field_col {
            Some(c) => database.get_relative(r, c),
            None => LiteralValue::Empty,
        };
        if value.is_empty() && !acc.allow_empty_match_field() {
            continue;
        }
        matched += 1;
        if !acc.process_match(&value) {
            break;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        records = db_rows.saturating_sub(1),
        visited,
        matched,
        criteria_rows = criteria_rows.len(),
        "database scan finished"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (visited, matched);

    Ok(acc.result())
}

fn header_matches(header: &LiteralValue, name: &str) -> bool {
    match header {
        LiteralValue::Error(_) | LiteralValue::Empty | LiteralValue::Missing => false,
        h => coerce_to_text(h).is_ok_and(|t| eq_ignore_case(t.trim(), name)),
    }
}

/// Resolve the field argument to a 0-based column within the database.
///
/// Text is matched against the headers (trimmed, case-insensitive); a number
/// is a 1-based column index, truncated toward zero.
pub(crate) fn resolve_field_index(
    field: &LiteralValue,
    headers: &[LiteralValue],
) -> Result<u32, ExcelError> {
    match field {
        LiteralValue::Error(e) => Err(e.clone()),
        LiteralValue::Text(name) => {
            let name = name.trim();
            headers
                .iter()
                .position(|h| header_matches(h, name))
                .map(|i| i as u32)
                .ok_or_else(|| {
                    ExcelError::new_value()
                        .with_message(format!("Field '{name}' not found in database headers"))
                })
        }
        LiteralValue::Number(n) => {
            let idx = n.trunc();
            if !idx.is_finite() || idx < 1.0 || idx > headers.len() as f64 {
                return Err(ExcelError::new_value().with_message(format!(
                    "Field index {idx} out of range (1-{})",
                    headers.len()
                )));
            }
            Ok(idx as u32 - 1)
        }
        _ => Err(ExcelError::new_value().with_message("Field must be text or number")),
    }
}

fn parse_criteria_area(
    criteria: &AreaRef<'_>,
    db_headers: &[LiteralValue],
    policy: WildcardPolicy,
) -> Result<Vec<CriteriaRow>, ExcelError> {
    let (crit_rows, crit_cols) = criteria.dims();

    // `None` outer: blank header, column ignored. `Some(None)`: unknown header.
    let mut col_map: Vec<Option<Option<u32>>> = Vec::with_capacity(crit_cols as usize);
    for c in 0..crit_cols {
        let header = criteria.get_relative(0, c);
        if header.is_empty() {
            col_map.push(None);
            continue;
        }
        let found = match coerce_to_text(&header) {
            Ok(name) => {
                let name = name.trim();
                db_headers
                    .iter()
                    .position(|h| header_matches(h, name))
                    .map(|i| i as u32)
            }
            Err(_) => None,
        };
        col_map.push(Some(found));
    }

    let mut rows = Vec::with_capacity(crit_rows.saturating_sub(1) as usize);
    for r in 1..crit_rows {
        let mut row: CriteriaRow = Vec::new();
        for (c, target) in col_map.iter().enumerate() {
            let Some(target) = target else { continue };
            let cell = criteria.get_relative(r, c as u32);
            if cell.is_empty() {
                continue;
            }
            row.push((*target, parse_criteria(&cell, policy)?));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// OR across criteria rows, AND within one. No criteria rows matches all.
fn row_matches_criteria(database: &AreaRef<'_>, row: u32, criteria_rows: &[CriteriaRow]) -> bool {
    if criteria_rows.is_empty() {
        return true;
    }
    criteria_rows.iter().any(|crit_row| {
        crit_row.iter().all(|(col, pred)| match col {
            Some(c) => criteria_match(pred, &database.get_relative(row, *c)),
            None => false,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::database::accumulators::{
        GetAccumulator, RecordCountAccumulator, SumAccumulator,
    };
    use crate::test_workbook::TestWorkbook;
    use crate::traits::CellResolver;
    use cellcalc_common::{AreaAddress, ExcelErrorKind};
    use std::sync::Mutex;

    fn t(s: &str) -> LiteralValue {
        LiteralValue::Text(s.into())
    }

    fn n(x: f64) -> LiteralValue {
        LiteralValue::Number(x)
    }

    /// A1:B4 = Fruit/Amount records, D1:E* left for criteria.
    fn fruit_book() -> TestWorkbook {
        TestWorkbook::new().with_range(
            "Sheet1",
            1,
            1,
            vec![
                vec![t("Fruit"), t("Amount")],
                vec![t("Apple"), n(10.0)],
                vec![t("Apple"), n(20.0)],
                vec![t("Pear"), n(5.0)],
            ],
        )
    }

    /// Records every row read through it.
    struct CountingResolver<'a> {
        inner: &'a TestWorkbook,
        rows_read: Mutex<Vec<u32>>,
    }

    impl CellResolver for CountingResolver<'_> {
        fn resolve_cell(
            &self,
            sheet: Option<&str>,
            row: u32,
            col: u32,
        ) -> Result<LiteralValue, ExcelError> {
            if let Ok(mut rows) = self.rows_read.lock() {
                rows.push(row);
            }
            self.inner.resolve_cell(sheet, row, col)
        }
    }

    #[test]
    fn field_by_header_or_index() {
        let headers = vec![t("Fruit"), t(" Amount "), n(2024.0)];
        assert_eq!(resolve_field_index(&t("amount"), &headers), Ok(1));
        assert_eq!(resolve_field_index(&t("  FRUIT"), &headers), Ok(0));
        assert_eq!(resolve_field_index(&t("2024"), &headers), Ok(2));
        assert_eq!(resolve_field_index(&n(2.9), &headers), Ok(1));
        assert_eq!(
            resolve_field_index(&n(4.0), &headers).unwrap_err().kind,
            ExcelErrorKind::Value
        );
        assert_eq!(
            resolve_field_index(&t("Price"), &headers).unwrap_err().kind,
            ExcelErrorKind::Value
        );
        assert_eq!(
            resolve_field_index(&LiteralValue::Boolean(true), &headers).unwrap_err().kind,
            ExcelErrorKind::Value
        );
        let na = ExcelError::new_na().with_message("upstream");
        assert_eq!(
            resolve_field_index(&LiteralValue::Error(na.clone()), &headers),
            Err(na)
        );
    }

    #[test]
    fn unknown_criteria_header_never_matches() {
        let wb = fruit_book()
            .with_cell_a1("Sheet1", "D1", t("Colour"))
            .with_cell_a1("Sheet1", "D2", t("Red"));
        let mut acc = SumAccumulator::new(true);
        let out = run_database_scan(
            &wb.area_a1("A1:B4"),
            &t("Amount"),
            &wb.area_a1("D1:D2"),
            &mut acc,
            &EvalConfig::default(),
        );
        assert_eq!(out, n(0.0));
    }

    #[test]
    fn blank_criteria_row_or_header_only_matches_everything() {
        let wb = fruit_book()
            .with_cell_a1("Sheet1", "D1", t("Fruit"))
            .with_cell_a1("Sheet1", "D2", t("Pear"));
        let cfg = EvalConfig::default();

        // D1:D3 has a blank third row, which ORs in "every record".
        let mut acc = SumAccumulator::new(true);
        let out = run_database_scan(
            &wb.area_a1("A1:B4"),
            &t("Amount"),
            &wb.area_a1("D1:D3"),
            &mut acc,
            &cfg,
        );
        assert_eq!(out, n(35.0));

        let mut acc = SumAccumulator::new(true);
        let out = run_database_scan(
            &wb.area_a1("A1:B4"),
            &t("Amount"),
            &wb.area_a1("D1"),
            &mut acc,
            &cfg,
        );
        assert_eq!(out, n(35.0));
    }

    #[test]
    fn blank_criteria_header_column_is_ignored() {
        let wb = fruit_book()
            .with_cell_a1("Sheet1", "E1", t("Fruit"))
            .with_cell_a1("Sheet1", "D2", t("ignored"))
            .with_cell_a1("Sheet1", "E2", t("Apple"));
        let mut acc = SumAccumulator::new(true);
        let out = run_database_scan(
            &wb.area_a1("A1:B4"),
            &t("Amount"),
            &wb.area_a1("D1:E2"),
            &mut acc,
            &EvalConfig::default(),
        );
        assert_eq!(out, n(30.0));
    }

    #[test]
    fn get_stops_after_second_match() {
        let wb = fruit_book()
            .with_cell_a1("Sheet1", "D1", t("Fruit"))
            .with_cell_a1("Sheet1", "D2", t("Apple"));
        let counting = CountingResolver {
            inner: &wb,
            rows_read: Mutex::new(Vec::new()),
        };
        let database = AreaRef::new(AreaAddress::parse_a1("A1:B4").unwrap(), &counting);
        let criteria = wb.area_a1("D1:D2");

        let mut acc = GetAccumulator::new();
        let out = run_database_scan(
            &database,
            &t("Amount"),
            &criteria,
            &mut acc,
            &EvalConfig::default(),
        );
        assert_eq!(out.error_kind(), Some(ExcelErrorKind::Num));

        let rows = counting.rows_read.lock().unwrap();
        assert!(rows.contains(&3));
        assert!(!rows.contains(&4), "record after the second match was visited: {rows:?}");
    }

    #[test]
    fn wildcard_criteria_report_not_implemented() {
        let wb = fruit_book()
            .with_cell_a1("Sheet1", "D1", t("Fruit"))
            .with_cell_a1("Sheet1", "D2", t("Ap*"));
        let mut acc = SumAccumulator::new(true);
        let out = run_database_scan(
            &wb.area_a1("A1:B4"),
            &t("Amount"),
            &wb.area_a1("D1:D2"),
            &mut acc,
            &EvalConfig::default(),
        );
        assert_eq!(out.error_kind(), Some(ExcelErrorKind::NImpl));
    }

    #[test]
    fn error_cells_do_not_abort_the_scan() {
        let wb = fruit_book()
            .with_cell_a1("Sheet1", "A3", LiteralValue::Error(ExcelError::new_div()))
            .with_cell_a1("Sheet1", "D1", t("Fruit"))
            .with_cell_a1("Sheet1", "D2", t("<>Pear"));
        let mut acc = SumAccumulator::new(true);
        let out = run_database_scan(
            &wb.area_a1("A1:B4"),
            &t("Amount"),
            &wb.area_a1("D1:D2"),
            &mut acc,
            &EvalConfig::default(),
        );
        assert_eq!(out, n(10.0));
    }

    #[test]
    fn record_count_skips_field_resolution() {
        let wb = fruit_book()
            .with_cell_a1("Sheet1", "D1", t("Fruit"))
            .with_cell_a1("Sheet1", "D2", t("Apple"));
        let mut acc = RecordCountAccumulator::new();
        let out = run_database_scan(
            &wb.area_a1("A1:B4"),
            &LiteralValue::Missing,
            &wb.area_a1("D1:D2"),
            &mut acc,
            &EvalConfig::default(),
        );
        assert_eq!(out, n(2.0));
    }
}
