/// How text criteria containing `*` or `?` are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WildcardPolicy {
    /// Fail the evaluation with `#N/IMPL!`.
    #[default]
    Reject,
    /// Compare `*` and `?` as ordinary characters.
    Literal,
}

/// Evaluation settings shared by every function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Accumulate SUM/AVERAGE/PRODUCT style folds in exact decimal
    /// arithmetic before converting back to `f64`.
    pub decimal_aggregation: bool,
    pub wildcard_policy: WildcardPolicy,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            decimal_aggregation: true,
            wildcard_policy: WildcardPolicy::Reject,
        }
    }
}
