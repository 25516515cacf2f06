pub mod criteria_aggregates;
pub mod numeric;

use crate::function_registry::FunctionRegistry;

pub use criteria_aggregates::{AverageIfFn, CountIfFn, SumIfFn};
pub use numeric::CeilingFn;

pub fn register_builtins(registry: &mut FunctionRegistry) {
    numeric::register_builtins(registry);
    criteria_aggregates::register_builtins(registry);
}
