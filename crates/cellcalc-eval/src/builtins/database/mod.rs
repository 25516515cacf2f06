//! Database functions (D-functions)
//!
//! Every D-function has the signature `(database, field, criteria)`:
//! - `database` is an area whose first row holds column headers and whose
//!   later rows are records;
//! - `field` selects a column by header text (case-insensitive) or by
//!   1-based index;
//! - `criteria` is a small table: a header row naming database columns,
//!   then rows of predicates. Rows are OR'd, columns within a row AND'd.
//!
//! The functions differ only in the accumulator folded over the selected
//! column of matching records; the scan itself lives in [`scan`].

pub mod accumulators;
pub mod scan;

use cellcalc_common::{ExcelError, LiteralValue};
use cellcalc_macros::func_caps;

pub use accumulators::{
    AverageAccumulator, CountAAccumulator, CountAccumulator, DeviationAccumulator, DeviationKind,
    GetAccumulator, MaxAccumulator, MinAccumulator, ProductAccumulator, RecordCountAccumulator,
    SumAccumulator,
};
pub use scan::{DatabaseAccumulator, run_database_scan};

use super::utils::ARG_DATABASE;
use crate::args::{ArgSchema, PreparedArg, validate_and_prepare};
use crate::function::Function;
use crate::function_registry::FunctionRegistry;
use crate::traits::{AreaRef, CalcValue, FunctionContext};

fn area_arg<'p, 'a>(
    arg: Option<&'p PreparedArg<'a>>,
    what: &str,
) -> Result<&'p AreaRef<'a>, ExcelError> {
    match arg {
        Some(PreparedArg::Area(a)) => Ok(a),
        Some(PreparedArg::Value(LiteralValue::Error(e))) => Err(e.clone()),
        _ => Err(ExcelError::new_value().with_message(format!("{what} must be a single range"))),
    }
}

/// Shared body of every D-function: shape the three arguments, then run
/// the scan with `acc`.
fn eval_database(
    name: &'static str,
    args: &[CalcValue<'_>],
    ctx: &FunctionContext,
    acc: &mut dyn DatabaseAccumulator,
) -> Result<LiteralValue, ExcelError> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("dfunction", name).entered();

    if args.len() != 3 {
        return Err(ExcelError::new_value().with_message(format!(
            "{name} expects 3 arguments, got {}",
            args.len()
        )));
    }
    let prepared = validate_and_prepare(args, &ARG_DATABASE, ctx)?;
    let database = area_arg(prepared.items.first(), "Database")?;
    let criteria = area_arg(prepared.items.get(2), "Criteria")?;
    let field = prepared.value(1).cloned().unwrap_or(LiteralValue::Missing);

    Ok(run_database_scan(database, &field, criteria, acc, &ctx.config))
}

/// `DCOUNT`/`DCOUNTA` count whole records when the field is omitted.
fn field_omitted(args: &[CalcValue<'_>]) -> bool {
    args.get(1).is_none_or(CalcValue::is_missing)
}

/* ─────────────────────────── DSUM ──────────────────────────── */
#[derive(Debug)]
pub struct DSumFn;

/// Adds the numbers in a database field for records that match the criteria.
///
/// # Remarks
/// - Blank and non-numeric field cells are skipped.
/// - Accumulation is exact for short decimals (`0.1 + 0.2` sums to `0.3`).
/// - An unknown `field` returns `#VALUE!`.
impl Function for DSumFn {
    func_caps!(PURE, REDUCTION, DATABASE);

    fn name(&self) -> &'static str {
        "DSUM"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let mut acc = SumAccumulator::new(ctx.config.decimal_aggregation);
        eval_database(self.name(), args, ctx, &mut acc)
    }
}

/* ─────────────────────────── DAVERAGE ──────────────────────────── */
#[derive(Debug)]
pub struct DAverageFn;

/// Returns the arithmetic mean of the numbers in a database field for
/// matching records.
///
/// # Remarks
/// - Returns `0` when no numeric value matches.
/// - The final division is carried out in decimal arithmetic.
impl Function for DAverageFn {
    func_caps!(PURE, REDUCTION, DATABASE);

    fn name(&self) -> &'static str {
        "DAVERAGE"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let mut acc = AverageAccumulator::new(ctx.config.decimal_aggregation);
        eval_database(self.name(), args, ctx, &mut acc)
    }
}

/* ─────────────────────────── DCOUNT ──────────────────────────── */
#[derive(Debug)]
pub struct DCountFn;

/// Counts numeric cells in a database field for matching records.
///
/// With `field` omitted (`DCOUNT(db,,criteria)`) every matching record is
/// counted.
impl Function for DCountFn {
    func_caps!(PURE, REDUCTION, DATABASE);

    fn name(&self) -> &'static str {
        "DCOUNT"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        if field_omitted(args) {
            let mut acc = RecordCountAccumulator::new();
            return eval_database(self.name(), args, ctx, &mut acc);
        }
        let mut acc = CountAccumulator::new();
        eval_database(self.name(), args, ctx, &mut acc)
    }
}

/* ─────────────────────────── DCOUNTA ──────────────────────────── */
#[derive(Debug)]
pub struct DCountAFn;

/// Counts non-blank cells in a database field for matching records.
impl Function for DCountAFn {
    func_caps!(PURE, REDUCTION, DATABASE);

    fn name(&self) -> &'static str {
        "DCOUNTA"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        if field_omitted(args) {
            let mut acc = RecordCountAccumulator::new();
            return eval_database(self.name(), args, ctx, &mut acc);
        }
        let mut acc = CountAAccumulator::new();
        eval_database(self.name(), args, ctx, &mut acc)
    }
}

/* ─────────────────────────── DMIN ──────────────────────────── */
#[derive(Debug)]
pub struct DMinFn;

/// Smallest number in a database field for matching records; `0` if none.
impl Function for DMinFn {
    func_caps!(PURE, REDUCTION, DATABASE);

    fn name(&self) -> &'static str {
        "DMIN"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_database(self.name(), args, ctx, &mut MinAccumulator::new())
    }
}

/* ─────────────────────────── DMAX ──────────────────────────── */
#[derive(Debug)]
pub struct DMaxFn;

/// Largest number in a database field for matching records; `0` if none.
impl Function for DMaxFn {
    func_caps!(PURE, REDUCTION, DATABASE);

    fn name(&self) -> &'static str {
        "DMAX"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_database(self.name(), args, ctx, &mut MaxAccumulator::new())
    }
}

/* ─────────────────────────── DPRODUCT ──────────────────────────── */
#[derive(Debug)]
pub struct DProductFn;

/// Multiplies the numbers in a database field for matching records.
///
/// # Remarks
/// - Returns `0` when no numeric value matches.
impl Function for DProductFn {
    func_caps!(PURE, REDUCTION, DATABASE);

    fn name(&self) -> &'static str {
        "DPRODUCT"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let mut acc = ProductAccumulator::new(ctx.config.decimal_aggregation);
        eval_database(self.name(), args, ctx, &mut acc)
    }
}

/* ─────────────────────────── DGET ──────────────────────────── */
#[derive(Debug)]
pub struct DGetFn;

/// Extracts the single field value of the one record matching the criteria.
///
/// # Remarks
/// - No match, or a match whose field cell is blank, returns `#VALUE!`.
/// - More than one match returns `#NUM!`; the scan stops at the second match.
impl Function for DGetFn {
    func_caps!(PURE, LOOKUP, DATABASE);

    fn name(&self) -> &'static str {
        "DGET"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_database(self.name(), args, ctx, &mut GetAccumulator::new())
    }
}

/* ─────────────────────── DSTDEV / DSTDEVP / DVAR / DVARP ─────────────────────── */

#[derive(Debug)]
pub struct DStdevFn;
#[derive(Debug)]
pub struct DStdevPFn;
#[derive(Debug)]
pub struct DVarFn;
#[derive(Debug)]
pub struct DVarPFn;

macro_rules! deviation_fn {
    ($ty:ident, $name:literal, $kind:expr) => {
        impl Function for $ty {
            func_caps!(PURE, REDUCTION, DATABASE);

            fn name(&self) -> &'static str {
                $name
            }

            fn min_args(&self) -> usize {
                3
            }

            fn arg_schema(&self) -> &'static [ArgSchema] {
                &ARG_DATABASE[..]
            }

            fn eval_scalar<'a>(
                &self,
                args: &[CalcValue<'a>],
                ctx: &FunctionContext,
            ) -> Result<LiteralValue, ExcelError> {
                let mut acc = DeviationAccumulator::new($kind);
                eval_database(self.name(), args, ctx, &mut acc)
            }
        }
    };
}

deviation_fn!(DStdevFn, "DSTDEV", DeviationKind::Stdev);
deviation_fn!(DStdevPFn, "DSTDEVP", DeviationKind::StdevP);
deviation_fn!(DVarFn, "DVAR", DeviationKind::Var);
deviation_fn!(DVarPFn, "DVARP", DeviationKind::VarP);

pub fn register_builtins(registry: &mut FunctionRegistry) {
    crate::register_functions!(
        registry;
        DSumFn,
        DAverageFn,
        DCountFn,
        DCountAFn,
        DMaxFn,
        DMinFn,
        DProductFn,
        DGetFn,
        DStdevFn,
        DStdevPFn,
        DVarFn,
        DVarPFn,
    );
}
