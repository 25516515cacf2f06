//! Reference information functions: ROW, COLUMN
//!
//! Without arguments, ROW and COLUMN return the formula cell's own position.

use std::sync::Arc;

use cellcalc_common::{ExcelError, LiteralValue};
use cellcalc_macros::func_caps;

use crate::args::ArgSchema;
use crate::builtins::utils::ARG_OPT_REF;
use crate::function::Function;
use crate::function_registry::FunctionRegistry;
use crate::traits::{AreaRef, CalcValue, FunctionContext};

/// The single area named by the optional reference argument, `None` when
/// omitted.
fn reference_arg<'v, 'a>(
    args: &'v [CalcValue<'a>],
) -> Result<Option<&'v AreaRef<'a>>, ExcelError> {
    match args.first() {
        None => Ok(None),
        Some(CalcValue::Scalar(LiteralValue::Missing)) => Ok(None),
        Some(CalcValue::Scalar(LiteralValue::Error(e))) => Err(e.clone()),
        Some(CalcValue::Scalar(_)) => {
            Err(ExcelError::new_value().with_message("Argument must be a reference"))
        }
        Some(other) => other.as_single_area().map(Some).ok_or_else(|| {
            ExcelError::new_value().with_message("Multi-area references are not supported")
        }),
    }
}

#[derive(Debug)]
pub struct RowFn;

/// Returns the row number of a reference, or of the current cell when omitted.
///
/// # Remarks
/// - With a range argument, `ROW` returns the first row in that reference.
impl Function for RowFn {
    fn name(&self) -> &'static str {
        "ROW"
    }

    func_caps!(PURE, LOOKUP);

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_OPT_REF[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let row = reference_arg(args)?.map_or(ctx.row, AreaRef::first_row);
        Ok(LiteralValue::Number(row as f64))
    }
}

#[derive(Debug)]
pub struct ColumnFn;

/// Returns the column number of a reference, or of the current cell when
/// omitted.
impl Function for ColumnFn {
    fn name(&self) -> &'static str {
        "COLUMN"
    }

    func_caps!(PURE, LOOKUP);

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_OPT_REF[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let col = reference_arg(args)?.map_or(ctx.col, AreaRef::first_col);
        Ok(LiteralValue::Number(col as f64))
    }
}

pub fn register_builtins(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(RowFn));
    registry.register(Arc::new(ColumnFn));
}
