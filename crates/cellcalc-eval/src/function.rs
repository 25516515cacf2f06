//! cellcalc-eval/src/function.rs
// Home of the core `Function` trait and its capability flags.

use crate::args::ArgSchema;
use crate::traits::{CalcValue, FunctionContext};
use cellcalc_common::{ExcelError, LiteralValue};

bitflags::bitflags! {
    /// Describes the capabilities and properties of a function.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FnCaps: u16 {
        // --- Semantics ---
        /// Same output for the same input, no side effects.
        const PURE          = 0b0000_0000_0001;

        // --- Shape ---
        /// Reduces a range of inputs to a single value (e.g. `SUMIF`).
        const REDUCTION     = 0b0000_0000_0100;
        /// Operates on each scalar argument independently (e.g. `CEILING`).
        const ELEMENTWISE   = 0b0000_0000_1000;
        /// Selects among its inputs or inspects references (e.g. `CHOOSE`, `ROW`).
        const LOOKUP        = 0b0000_0010_0000;

        // --- Input Data Types ---
        /// Primarily operates on numbers.
        const NUMERIC_ONLY  = 0b0000_0100_0000;

        // --- Families ---
        /// Scans a database area through a criteria area (`DSUM`, `DGET`, …).
        const DATABASE      = 0b0001_0000_0000;
    }
}

/// Object-safe trait for all spreadsheet functions.
///
/// Arguments arrive already evaluated; references stay lazy as
/// [`CalcValue::Area`] / [`CalcValue::List`] so each function decides how
/// to reduce them.
pub trait Function: Send + Sync + 'static {
    /// Capability flags for this function
    fn caps(&self) -> FnCaps {
        FnCaps::PURE
    }

    fn name(&self) -> &'static str;
    fn namespace(&self) -> &'static str {
        ""
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        false
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &[]
    }

    /// The evaluation body. `Err` is an ordinary spreadsheet error result,
    /// not a fault.
    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError>;

    /// Arity check, evaluation, and folding of `Err` into an error value.
    fn dispatch<'a>(&self, args: &[CalcValue<'a>], ctx: &FunctionContext) -> LiteralValue {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("dispatch", name = self.name()).entered();

        if args.len() < self.min_args() {
            return LiteralValue::Error(ExcelError::new_value().with_message(format!(
                "{} expects at least {} arguments, got {}",
                self.name(),
                self.min_args(),
                args.len()
            )));
        }
        let schema = self.arg_schema();
        if !self.variadic() && !schema.is_empty() && args.len() > schema.len() {
            return LiteralValue::Error(ExcelError::new_value().with_message(format!(
                "{} expects at most {} arguments, got {}",
                self.name(),
                schema.len(),
                args.len()
            )));
        }

        match self.eval_scalar(args, ctx) {
            Ok(v) => v,
            Err(e) => LiteralValue::Error(e),
        }
    }
}
