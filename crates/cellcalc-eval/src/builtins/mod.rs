pub mod database;
pub mod financial;
pub mod lookup;
pub mod math;
pub(crate) mod utils;

use crate::function_registry::FunctionRegistry;

pub fn load_builtins(registry: &mut FunctionRegistry) {
    database::register_builtins(registry);
    financial::register_builtins(registry);
    lookup::register_builtins(registry);
    math::register_builtins(registry);
}
