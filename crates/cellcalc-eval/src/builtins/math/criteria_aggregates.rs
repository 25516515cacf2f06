//! SUMIF / COUNTIF / AVERAGEIF
//!
//! Single-criterion siblings of the D-functions: each cell of `range` is
//! tested against one criterion and the cell at the same offset in the
//! value range is folded through a database accumulator.

use cellcalc_common::{ExcelError, LiteralValue};
use cellcalc_macros::func_caps;

use crate::args::{ArgSchema, PreparedArgs, parse_criteria, validate_and_prepare};
use crate::builtins::database::{
    AverageAccumulator, DatabaseAccumulator, RecordCountAccumulator, SumAccumulator,
};
use crate::builtins::utils::{ARG_RANGE_CRITERIA_OPT_RANGE, criteria_match};
use crate::function::Function;
use crate::function_registry::FunctionRegistry;
use crate::traits::{AreaRef, CalcValue, FunctionContext};

fn range_arg<'p, 'a>(
    prepared: &'p PreparedArgs<'a>,
    idx: usize,
) -> Result<&'p AreaRef<'a>, ExcelError> {
    if let Some(LiteralValue::Error(e)) = prepared.value(idx) {
        return Err(e.clone());
    }
    prepared.area(idx).ok_or_else(|| {
        ExcelError::new_value().with_message("Range argument must be a single reference")
    })
}

/// Fold the cells paired with every criteria hit.
///
/// The value range, when given, is read from its top-left corner with the
/// shape of the criteria range.
fn fold_criteria_matches(
    args: &[CalcValue<'_>],
    ctx: &FunctionContext,
    acc: &mut dyn DatabaseAccumulator,
) -> Result<LiteralValue, ExcelError> {
    let prepared = validate_and_prepare(args, &ARG_RANGE_CRITERIA_OPT_RANGE, ctx)?;
    let range = range_arg(&prepared, 0)?;
    let criterion = prepared.value(1).cloned().unwrap_or(LiteralValue::Missing);
    let pred = parse_criteria(&criterion, ctx.config.wildcard_policy)?;

    let (rows, cols) = range.dims();
    let values = if prepared.len() > 2 {
        range_arg(&prepared, 2)?
            .resized(rows, cols)
            .ok_or_else(|| ExcelError::new_ref().with_message("Value range overflows the sheet"))?
    } else {
        range.clone()
    };

    acc.reset();
    'scan: for r in 0..rows {
        for c in 0..cols {
            if !criteria_match(&pred, &range.get_relative(r, c)) {
                continue;
            }
            let v = values.get_relative(r, c);
            if v.is_empty() && !acc.allow_empty_match_field() {
                continue;
            }
            if !acc.process_match(&v) {
                break 'scan;
            }
        }
    }
    Ok(acc.result())
}

/* ─────────────────────────── SUMIF ──────────────────────────── */

/// Adds the cells selected by a single criterion.
///
/// `SUMIF(range, criteria, [sum_range])`; without `sum_range` the tested
/// cells themselves are summed. Only numbers contribute.
#[derive(Debug)]
pub struct SumIfFn;

impl Function for SumIfFn {
    func_caps!(PURE, REDUCTION);

    fn name(&self) -> &'static str {
        "SUMIF"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_RANGE_CRITERIA_OPT_RANGE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let mut acc = SumAccumulator::new(ctx.config.decimal_aggregation);
        fold_criteria_matches(args, ctx, &mut acc)
    }
}

/* ─────────────────────────── COUNTIF ──────────────────────────── */

#[derive(Debug)]
pub struct CountIfFn;

impl Function for CountIfFn {
    func_caps!(PURE, REDUCTION);

    fn name(&self) -> &'static str {
        "COUNTIF"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_RANGE_CRITERIA_OPT_RANGE[..2]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        fold_criteria_matches(args, ctx, &mut RecordCountAccumulator::new())
    }
}

/* ─────────────────────────── AVERAGEIF ──────────────────────────── */

/// Mean of the cells selected by a single criterion.
///
/// # Remarks
/// - The division is carried out in decimal arithmetic.
/// - Returns `#DIV/0!` when no numeric cell is selected.
#[derive(Debug)]
pub struct AverageIfFn;

impl Function for AverageIfFn {
    func_caps!(PURE, REDUCTION);

    fn name(&self) -> &'static str {
        "AVERAGEIF"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_RANGE_CRITERIA_OPT_RANGE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let mut acc = AverageAccumulator::new(ctx.config.decimal_aggregation);
        let result = fold_criteria_matches(args, ctx, &mut acc)?;
        if acc.count() == 0 {
            return Err(ExcelError::new_div());
        }
        Ok(result)
    }
}

pub fn register_builtins(registry: &mut FunctionRegistry) {
    crate::register_functions!(registry; SumIfFn, CountIfFn, AverageIfFn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EvalConfig, WildcardPolicy};
    use crate::test_workbook::TestWorkbook;
    use cellcalc_common::ExcelErrorKind;

    fn t(s: &str) -> LiteralValue {
        LiteralValue::Text(s.into())
    }

    fn n(x: f64) -> LiteralValue {
        LiteralValue::Number(x)
    }

    /// A1:A5 fruit, B1:B5 amounts.
    fn book() -> TestWorkbook {
        TestWorkbook::new().with_range(
            "Sheet1",
            1,
            1,
            vec![
                vec![t("Apple"), n(10.0)],
                vec![t("Pear"), n(5.0)],
                vec![t("apple"), n(20.0)],
                vec![t("Plum"), t("n/a")],
                vec![LiteralValue::Empty, n(0.1)],
            ],
        )
    }

    fn args<'a>(
        wb: &'a TestWorkbook,
        range: &str,
        crit: LiteralValue,
        values: Option<&str>,
    ) -> Vec<CalcValue<'a>> {
        let mut v = vec![CalcValue::Area(wb.area_a1(range)), CalcValue::Scalar(crit)];
        if let Some(values) = values {
            v.push(CalcValue::Area(wb.area_a1(values)));
        }
        v
    }

    fn ctx() -> FunctionContext {
        FunctionContext::new(1, 10)
    }

    #[test]
    fn sumif_with_and_without_sum_range() {
        let wb = book();
        let by_fruit = args(&wb, "A1:A5", t("apple"), Some("B1:B5"));
        assert_eq!(SumIfFn.dispatch(&by_fruit, &ctx()), n(30.0));
        let self_sum = args(&wb, "B1:B5", t(">=10"), None);
        assert_eq!(SumIfFn.dispatch(&self_sum, &ctx()), n(30.0));
        // Only the top-left of the sum range matters.
        let corner = args(&wb, "A1:A5", t("Pear"), Some("B1"));
        assert_eq!(SumIfFn.dispatch(&corner, &ctx()), n(5.0));
    }

    #[test]
    fn countif_variants() {
        let wb = book();
        assert_eq!(CountIfFn.dispatch(&args(&wb, "A1:A5", t("APPLE"), None), &ctx()), n(2.0));
        assert_eq!(CountIfFn.dispatch(&args(&wb, "A1:A5", t("="), None), &ctx()), n(1.0));
        assert_eq!(CountIfFn.dispatch(&args(&wb, "A1:A5", t("<>"), None), &ctx()), n(4.0));
        assert_eq!(CountIfFn.dispatch(&args(&wb, "B1:B5", n(5.0), None), &ctx()), n(1.0));
        assert_eq!(
            CountIfFn.dispatch(&args(&wb, "A1:A5", t("A*"), None), &ctx()).error_kind(),
            Some(ExcelErrorKind::NImpl)
        );
        let literal = ctx().with_config(EvalConfig {
            wildcard_policy: WildcardPolicy::Literal,
            ..EvalConfig::default()
        });
        assert_eq!(CountIfFn.dispatch(&args(&wb, "A1:A5", t("A*"), None), &literal), n(0.0));
    }

    #[test]
    fn averageif_decimal_mean_and_empty() {
        let wb = TestWorkbook::new().with_range(
            "Sheet1",
            1,
            1,
            vec![vec![t("x"), n(0.1)], vec![t("x"), n(0.2)], vec![t("y"), n(9.0)]],
        );
        assert_eq!(
            AverageIfFn.dispatch(&args(&wb, "A1:A3", t("x"), Some("B1:B3")), &ctx()),
            n(0.15)
        );
        assert_eq!(
            AverageIfFn.dispatch(&args(&wb, "A1:A3", t("z"), Some("B1:B3")), &ctx()).error_kind(),
            Some(ExcelErrorKind::Div)
        );
    }

    #[test]
    fn range_must_be_a_reference() {
        let a = vec![CalcValue::Scalar(n(1.0)), CalcValue::Scalar(n(1.0))];
        assert_eq!(SumIfFn.dispatch(&a, &ctx()).error_kind(), Some(ExcelErrorKind::Value));
    }
}
