//! Meta crate that re-exports the cellcalc building blocks. Downstream users
//! can depend on this crate and opt into specific layers via feature flags
//! while keeping access to the underlying crates.

#[cfg(feature = "common")]
pub use cellcalc_common as common;

#[cfg(feature = "eval")]
pub use cellcalc_eval as eval;

#[cfg(feature = "common")]
pub use cellcalc_common::{AreaAddress, ExcelError, ExcelErrorKind, LiteralValue};

#[cfg(feature = "eval")]
pub use cellcalc_eval::{
    AreaRef, CalcValue, CellResolver, EvalConfig, FnCaps, Function, FunctionContext,
    FunctionRegistry, WildcardPolicy,
};

#[cfg(feature = "eval")]
pub mod doc_examples;
