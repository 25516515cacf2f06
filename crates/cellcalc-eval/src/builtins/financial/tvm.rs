//! Time Value of Money functions: PMT, IPMT

use std::sync::{Arc, LazyLock};

use cellcalc_common::{ExcelError, LiteralValue};
use cellcalc_macros::func_caps;

use crate::args::{ArgSchema, validate_and_prepare};
use crate::coercion::sanitize_numeric;
use crate::function::Function;
use crate::function_registry::FunctionRegistry;
use crate::traits::{CalcValue, FunctionContext};

fn optional_zero() -> ArgSchema {
    ArgSchema::number_lenient_scalar().optional(Some(LiteralValue::Number(0.0)))
}

/// Periodic payment for a fixed-rate annuity.
fn pmt(rate: f64, nper: f64, pv: f64, fv: f64, due: bool) -> f64 {
    if rate == 0.0 {
        return -(pv + fv) / nper;
    }
    let factor = (1.0 + rate).powf(nper);
    let type_adj = if due { 1.0 + rate } else { 1.0 };
    -(rate * (pv * factor + fv)) / ((factor - 1.0) * type_adj)
}

/// Future value after `nper` periods of `payment`.
fn fv(rate: f64, nper: f64, payment: f64, pv: f64, due: bool) -> f64 {
    if rate == 0.0 {
        return -(pv + payment * nper);
    }
    let factor = (1.0 + rate).powf(nper);
    let type_adj = if due { 1.0 + rate } else { 1.0 };
    -(pv * factor + payment * type_adj * (factor - 1.0) / rate)
}

/// Calculates the constant payment amount for a fixed-rate annuity or loan.
///
/// # Remarks
/// - `rate` is the interest rate per payment period.
/// - Cash paid out is negative and cash received is positive.
/// - `type = 0` means end-of-period payments; any other value means
///   beginning-of-period payments.
/// - Returns `#NUM!` when `nper` is zero.
#[derive(Debug)]
pub struct PmtFn;

impl Function for PmtFn {
    func_caps!(PURE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "PMT"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        static SCHEMA: LazyLock<Vec<ArgSchema>> = LazyLock::new(|| {
            vec![
                ArgSchema::number_lenient_scalar(), // rate
                ArgSchema::number_lenient_scalar(), // nper
                ArgSchema::number_lenient_scalar(), // pv
                optional_zero(),                    // fv
                optional_zero(),                    // type
            ]
        });
        &SCHEMA[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let p = validate_and_prepare(args, self.arg_schema(), ctx)?;
        let rate = p.number(0)?;
        let nper = p.number(1)?;
        let pv = p.number(2)?;
        let fv = p.number(3)?;
        let due = p.number(4)? != 0.0;

        if nper == 0.0 {
            return Err(ExcelError::new_num().with_message("PMT requires a non-zero nper"));
        }
        Ok(LiteralValue::Number(sanitize_numeric(pmt(rate, nper, pv, fv, due))?))
    }
}

/// Returns the interest component of a payment for a specific period.
///
/// # Remarks
/// - `per` is 1-based and must satisfy `1 <= per <= nper`, else `#NUM!`.
/// - With beginning-of-period payments the first period carries no interest.
#[derive(Debug)]
pub struct IpmtFn;

impl Function for IpmtFn {
    func_caps!(PURE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "IPMT"
    }

    fn min_args(&self) -> usize {
        4
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        static SCHEMA: LazyLock<Vec<ArgSchema>> = LazyLock::new(|| {
            vec![
                ArgSchema::number_lenient_scalar(), // rate
                ArgSchema::number_lenient_scalar(), // per
                ArgSchema::number_lenient_scalar(), // nper
                ArgSchema::number_lenient_scalar(), // pv
                optional_zero(),                    // fv
                optional_zero(),                    // type
            ]
        });
        &SCHEMA[..]
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let p = validate_and_prepare(args, self.arg_schema(), ctx)?;
        let rate = p.number(0)?;
        let per = p.number(1)?;
        let nper = p.number(2)?;
        let pv = p.number(3)?;
        let future = p.number(4)?;
        let due = p.number(5)? != 0.0;

        if per < 1.0 || per > nper {
            return Err(ExcelError::new_num()
                .with_message(format!("IPMT period {per} is outside 1..={nper}")));
        }

        let payment = pmt(rate, nper, pv, future, due);
        let balance = if per == 1.0 {
            if due { 0.0 } else { -pv }
        } else if due {
            fv(rate, per - 2.0, payment, pv, true) - payment
        } else {
            fv(rate, per - 1.0, payment, pv, false)
        };
        Ok(LiteralValue::Number(sanitize_numeric(balance * rate)?))
    }
}

pub fn register_builtins(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(PmtFn));
    registry.register(Arc::new(IpmtFn));
}
