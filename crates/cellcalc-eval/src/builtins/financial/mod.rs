pub mod tvm;

use crate::function_registry::FunctionRegistry;

pub use tvm::{IpmtFn, PmtFn};

pub fn register_builtins(registry: &mut FunctionRegistry) {
    tvm::register_builtins(registry);
}
