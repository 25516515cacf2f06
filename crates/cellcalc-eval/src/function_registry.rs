use crate::function::Function;
use crate::traits::{CalcValue, FunctionContext};
use cellcalc_common::{ExcelError, LiteralValue};
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FnKey {
    ns: String,
    name: String,
}

impl FnKey {
    fn new(ns: &str, name: &str) -> Self {
        Self {
            ns: ns.to_ascii_uppercase(),
            name: name.to_ascii_uppercase(),
        }
    }
}

/// Name → implementation table. Lookups are case-insensitive.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<FnKey, Arc<dyn Function>>,
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.functions.len())
            .finish()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with every built-in function.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::load_builtins(&mut registry);
        registry
    }

    /// Later registrations under the same name replace earlier ones.
    pub fn register(&mut self, f: Arc<dyn Function>) {
        self.functions.insert(FnKey::new(f.namespace(), f.name()), f);
    }

    pub fn get(&self, ns: &str, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(&FnKey::new(ns, name)).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&FnKey::new("", name))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names in the default namespace, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .functions
            .values()
            .filter(|f| f.namespace().is_empty())
            .map(|f| f.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Call `name` for the formula cell at `(row, col)` with default settings.
    pub fn evaluate(&self, name: &str, args: &[CalcValue<'_>], row: u32, col: u32) -> LiteralValue {
        self.evaluate_with(name, args, &FunctionContext::new(row, col))
    }

    /// Unknown names evaluate to `#NAME?`.
    pub fn evaluate_with(
        &self,
        name: &str,
        args: &[CalcValue<'_>],
        ctx: &FunctionContext,
    ) -> LiteralValue {
        match self.get("", name) {
            Some(f) => f.dispatch(args, ctx),
            None => LiteralValue::Error(
                ExcelError::new_name().with_message(format!("Unknown function {name}")),
            ),
        }
    }
}
