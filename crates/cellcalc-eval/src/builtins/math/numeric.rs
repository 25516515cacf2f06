use std::sync::Arc;

use cellcalc_common::{ExcelError, LiteralValue};
use cellcalc_macros::func_caps;

use crate::args::{ArgSchema, validate_and_prepare};
use crate::builtins::utils::ARG_NUM_LENIENT_TWO;
use crate::coercion::sanitize_numeric;
use crate::function::Function;
use crate::function_registry::FunctionRegistry;
use crate::traits::{CalcValue, FunctionContext};

/// Quotients this close to an integer are treated as exact multiples.
const MULTIPLE_EPSILON: f64 = 1e-12;

/// Rounds `number` up, away from zero for negative significance, to the
/// nearest multiple of `significance`.
///
/// # Remarks
/// - A zero significance returns `0`.
/// - A positive number with a negative significance returns `#NUM!`.
#[derive(Debug)]
pub struct CeilingFn;

impl Function for CeilingFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "CEILING"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_NUM_LENIENT_TWO[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let prepared = validate_and_prepare(args, self.arg_schema(), ctx)?;
        let number = prepared.number(0)?;
        let significance = prepared.number(1)?;
        Ok(LiteralValue::Number(ceiling(number, significance)?))
    }
}

fn ceiling(number: f64, significance: f64) -> Result<f64, ExcelError> {
    if number == 0.0 || significance == 0.0 {
        return Ok(0.0);
    }
    if number > 0.0 && significance < 0.0 {
        return Err(ExcelError::new_num()
            .with_message("CEILING significance must be positive for a positive number"));
    }
    let q = number / significance;
    let nearest = q.round();
    let steps = if (q - nearest).abs() < MULTIPLE_EPSILON {
        nearest
    } else {
        q.ceil()
    };
    let r = sanitize_numeric(steps * significance)?;
    Ok(if r == 0.0 { 0.0 } else { r })
}

pub fn register_builtins(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(CeilingFn));
}
