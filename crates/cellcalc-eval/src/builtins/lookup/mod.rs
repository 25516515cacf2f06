pub mod choose;
pub mod reference_info;

use crate::function_registry::FunctionRegistry;

pub use choose::ChooseFn;
pub use reference_info::{ColumnFn, RowFn};

pub fn register_builtins(registry: &mut FunctionRegistry) {
    choose::register_builtins(registry);
    reference_info::register_builtins(registry);
}
