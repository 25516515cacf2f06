//! Spreadsheet function evaluation core.
//!
//! Operand coercion, criteria parsing and the database (D-function) scan
//! engine, plus a handful of built-ins that exercise them. Callers hand
//! functions [`CalcValue`] arguments backed by their own [`CellResolver`]
//! and dispatch by name through a [`FunctionRegistry`].

pub mod args;
pub mod builtins;
pub mod coercion;
pub mod config;
pub mod function;
pub mod function_registry;
pub mod traits;

mod macros {
    mod registry_macro;
}

#[cfg(feature = "tracing")]
pub mod telemetry;

pub mod test_workbook;

#[cfg(test)]
mod tests;

pub use args::{
    ArgSchema, CoercionPolicy, CriteriaOperand, CriteriaPredicate, ShapeKind, parse_criteria,
    validate_and_prepare,
};
pub use builtins::database::{DatabaseAccumulator, run_database_scan};
pub use coercion::{
    coerce_to_bool, coerce_to_int, coerce_to_number, coerce_to_text, get_single_value,
    number_to_text, parse_double,
};
pub use config::{EvalConfig, WildcardPolicy};
pub use function::{FnCaps, Function};
pub use function_registry::FunctionRegistry;
pub use traits::{AreaRef, CalcValue, CellResolver, FunctionContext};

pub use cellcalc_common::{AreaAddress, ExcelError, ExcelErrorKind, LiteralValue};
