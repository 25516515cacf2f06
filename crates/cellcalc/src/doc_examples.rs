use crate::{CalcValue, FunctionRegistry, LiteralValue};

/// Call a built-in with scalar arguments from cell `A1`.
///
/// This helper is intended for documentation examples to avoid repetitive setup.
///
/// # Example
///
/// ```rust
/// # use cellcalc::doc_examples::eval_scalar;
/// use cellcalc::LiteralValue;
///
/// let value = eval_scalar("CEILING", &[LiteralValue::Number(2.5), LiteralValue::Number(1.0)]);
/// assert_eq!(value, LiteralValue::Number(3.0));
///
/// let missing = eval_scalar("NO_SUCH_FN", &[]);
/// assert!(missing.is_error());
/// ```
pub fn eval_scalar(name: &str, args: &[LiteralValue]) -> LiteralValue {
    let registry = FunctionRegistry::with_builtins();
    let args: Vec<CalcValue<'_>> = args.iter().cloned().map(CalcValue::Scalar).collect();
    registry.evaluate(name, &args, 1, 1)
}
