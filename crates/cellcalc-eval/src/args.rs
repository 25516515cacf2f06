use cellcalc_common::{ArgKind, ExcelError, ExcelErrorKind, LiteralValue};
use smallvec::{SmallVec, smallvec};

use crate::coercion::{coerce_to_number, get_single_value, parse_double};
use crate::config::WildcardPolicy;
use crate::traits::{AreaRef, CalcValue, FunctionContext};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ShapeKind {
    /// Reduced to one value by implicit intersection.
    Scalar,
    /// Kept as a lazy reference. Plain scalars pass through unless the
    /// schema's kinds demand a reference.
    Range,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CoercionPolicy {
    None,
    NumberLenientText,
}

#[derive(Clone, Debug)]
pub struct ArgSchema {
    pub kinds: SmallVec<[ArgKind; 2]>,
    pub required: bool,
    pub shape: ShapeKind,
    pub coercion: CoercionPolicy,
    /// Used when the argument is omitted or syntactically empty.
    pub default: Option<LiteralValue>,
}

impl ArgSchema {
    pub fn any() -> Self {
        Self {
            kinds: smallvec![ArgKind::Any],
            required: true,
            shape: ShapeKind::Scalar,
            coercion: CoercionPolicy::None,
            default: None,
        }
    }

    pub fn number_lenient_scalar() -> Self {
        Self {
            kinds: smallvec![ArgKind::Number],
            required: true,
            shape: ShapeKind::Scalar,
            coercion: CoercionPolicy::NumberLenientText,
            default: None,
        }
    }

    pub fn range() -> Self {
        Self {
            kinds: smallvec![ArgKind::Range],
            required: true,
            shape: ShapeKind::Range,
            coercion: CoercionPolicy::None,
            default: None,
        }
    }

    /// True when only a reference satisfies this argument.
    pub fn requires_reference(&self) -> bool {
        self.kinds.contains(&ArgKind::Range) && !self.kinds.contains(&ArgKind::Any)
    }

    pub fn optional(mut self, default: Option<LiteralValue>) -> Self {
        self.required = false;
        self.default = default;
        self
    }
}

/* ─────────────────────────── prepared arguments ─────────────────────────── */

#[derive(Debug, Clone)]
pub enum PreparedArg<'a> {
    Value(LiteralValue),
    Area(AreaRef<'a>),
    List(Vec<AreaRef<'a>>),
}

#[derive(Debug, Clone)]
pub struct PreparedArgs<'a> {
    pub items: Vec<PreparedArg<'a>>,
}

impl<'a> PreparedArgs<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn value(&self, idx: usize) -> Option<&LiteralValue> {
        match self.items.get(idx) {
            Some(PreparedArg::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Numeric view of a scalar-shaped argument. Error values come back as
    /// `Err` unchanged.
    pub fn number(&self, idx: usize) -> Result<f64, ExcelError> {
        match self.items.get(idx) {
            Some(PreparedArg::Value(v)) => coerce_to_number(v),
            Some(_) => Err(ExcelError::new_value()
                .with_message(format!("Argument {} must be a single value", idx + 1))),
            None => Err(ExcelError::new_value()
                .with_message(format!("Argument {} is missing", idx + 1))),
        }
    }

    pub fn area(&self, idx: usize) -> Option<&AreaRef<'a>> {
        match self.items.get(idx) {
            Some(PreparedArg::Area(a)) => Some(a),
            Some(PreparedArg::List(list)) if list.len() == 1 => list.first(),
            _ => None,
        }
    }
}

/// Shape and coerce `args` according to `schema`.
///
/// A one-entry schema repeats for every argument. Scalar-shaped arguments
/// are reduced with implicit intersection; a failed reduction becomes an
/// error *value* so the function can decide whether to propagate it.
/// Trailing optional arguments that were not supplied are filled from their
/// defaults.
pub fn validate_and_prepare<'a>(
    args: &[CalcValue<'a>],
    schema: &[ArgSchema],
    ctx: &FunctionContext,
) -> Result<PreparedArgs<'a>, ExcelError> {
    if schema.is_empty() {
        return Ok(PreparedArgs { items: Vec::new() });
    }

    let required = schema.iter().filter(|s| s.required).count();
    if schema.len() > 1 && args.len() < required {
        return Err(ExcelError::new_value().with_message(format!(
            "Expected at least {required} arguments, got {}",
            args.len()
        )));
    }

    let mut items: Vec<PreparedArg<'a>> = Vec::with_capacity(args.len().max(schema.len()));
    for (idx, arg) in args.iter().enumerate() {
        let spec = if schema.len() == 1 {
            &schema[0]
        } else if let Some(s) = schema.get(idx) {
            s
        } else {
            return Err(ExcelError::new(ExcelErrorKind::Value).with_message("Too many arguments"));
        };

        if arg.is_missing() {
            if let Some(d) = &spec.default {
                items.push(PreparedArg::Value(d.clone()));
                continue;
            }
        }

        match spec.shape {
            ShapeKind::Scalar => {
                let v = get_single_value(arg, ctx.row, ctx.col).unwrap_or_else(LiteralValue::Error);
                items.push(PreparedArg::Value(apply_coercion(v, spec.coercion)));
            }
            ShapeKind::Range => items.push(match arg {
                CalcValue::Scalar(v) if spec.requires_reference() && !passes_through(v) => {
                    PreparedArg::Value(LiteralValue::Error(ExcelError::new_value().with_message(
                        format!("Argument {} must be a reference", idx + 1),
                    )))
                }
                CalcValue::Scalar(v) => PreparedArg::Value(v.clone()),
                CalcValue::Area(a) => PreparedArg::Area(a.clone()),
                CalcValue::List(list) if list.len() == 1 => PreparedArg::Area(list[0].clone()),
                CalcValue::List(list) => PreparedArg::List(list.clone()),
            }),
        }
    }

    if schema.len() > 1 {
        for spec in schema.iter().skip(args.len()) {
            match &spec.default {
                Some(d) => items.push(PreparedArg::Value(d.clone())),
                None => break,
            }
        }
    }

    Ok(PreparedArgs { items })
}

/// Errors and omitted arguments are handed to the function unchanged.
fn passes_through(v: &LiteralValue) -> bool {
    matches!(v, LiteralValue::Error(_) | LiteralValue::Missing)
}

fn apply_coercion(v: LiteralValue, policy: CoercionPolicy) -> LiteralValue {
    if v.is_error() {
        return v;
    }
    match policy {
        CoercionPolicy::NumberLenientText => match coerce_to_number(&v) {
            Ok(n) => LiteralValue::Number(n),
            Err(e) => LiteralValue::Error(e),
        },
        CoercionPolicy::None => v,
    }
}

/* ──────────────────────────── criteria parsing ──────────────────────────── */

/// Right-hand side of a relational criterion.
#[derive(Clone, Debug, PartialEq)]
pub enum CriteriaOperand {
    Number(f64),
    Text(String),
}

/// A parsed criterion such as `">=10"`, `"<>Apple"` or `TRUE`.
#[derive(Clone, Debug, PartialEq)]
pub enum CriteriaPredicate {
    Eq(LiteralValue),
    Ne(LiteralValue),
    Gt(CriteriaOperand),
    Ge(CriteriaOperand),
    Lt(CriteriaOperand),
    Le(CriteriaOperand),
    /// `"="` on its own.
    IsBlank,
    /// `"<>"` on its own.
    IsNonBlank,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

fn split_operator(s: &str) -> (Option<CmpOp>, &str) {
    // Two-character operators first.
    for (prefix, op) in [
        ("<=", CmpOp::Le),
        (">=", CmpOp::Ge),
        ("<>", CmpOp::Ne),
        ("<", CmpOp::Lt),
        (">", CmpOp::Gt),
        ("=", CmpOp::Eq),
    ] {
        if let Some(rest) = s.strip_prefix(prefix) {
            return (Some(op), rest);
        }
    }
    (None, s)
}

/// Parse a criteria cell or argument into a predicate.
///
/// Text with an unescaped `*` or `?` fails with `#N/IMPL!` under
/// [`WildcardPolicy::Reject`]; under [`WildcardPolicy::Literal`] the
/// characters compare as themselves. `~*` and `~?` are always literal.
pub fn parse_criteria(
    value: &LiteralValue,
    policy: WildcardPolicy,
) -> Result<CriteriaPredicate, ExcelError> {
    match value {
        LiteralValue::Number(n) => Ok(CriteriaPredicate::Eq(LiteralValue::Number(*n))),
        LiteralValue::Boolean(b) => Ok(CriteriaPredicate::Eq(LiteralValue::Boolean(*b))),
        LiteralValue::Error(e) => Ok(CriteriaPredicate::Eq(LiteralValue::Error(e.clone()))),
        LiteralValue::Empty | LiteralValue::Missing => Ok(CriteriaPredicate::IsBlank),
        LiteralValue::Text(s) => parse_text_criteria(s, policy),
    }
}

fn parse_text_criteria(s: &str, policy: WildcardPolicy) -> Result<CriteriaPredicate, ExcelError> {
    let (op, rhs) = split_operator(s);

    if rhs.is_empty() {
        match op {
            Some(CmpOp::Eq) | None => return Ok(CriteriaPredicate::IsBlank),
            Some(CmpOp::Ne) => return Ok(CriteriaPredicate::IsNonBlank),
            _ => {}
        }
    }

    let n = parse_double(rhs);
    if !n.is_nan() {
        return Ok(build(op, LiteralValue::Number(n), CriteriaOperand::Number(n)));
    }

    if matches!(op, None | Some(CmpOp::Eq) | Some(CmpOp::Ne)) {
        if rhs.eq_ignore_ascii_case("TRUE") || rhs.eq_ignore_ascii_case("FALSE") {
            let b = LiteralValue::Boolean(rhs.eq_ignore_ascii_case("TRUE"));
            return Ok(match op {
                Some(CmpOp::Ne) => CriteriaPredicate::Ne(b),
                _ => CriteriaPredicate::Eq(b),
            });
        }
        if let Some(kind) = ExcelErrorKind::parse(rhs) {
            let e = LiteralValue::Error(ExcelError::new(kind));
            return Ok(match op {
                Some(CmpOp::Ne) => CriteriaPredicate::Ne(e),
                _ => CriteriaPredicate::Eq(e),
            });
        }
    }

    if has_unescaped_wildcard(rhs) && policy == WildcardPolicy::Reject {
        return Err(ExcelError::new_nimpl()
            .with_message(format!("Wildcard criteria '{s}' are not supported")));
    }
    let text = unescape_wildcards(rhs);
    Ok(build(
        op,
        LiteralValue::Text(text.clone()),
        CriteriaOperand::Text(text),
    ))
}

fn build(op: Option<CmpOp>, eq: LiteralValue, operand: CriteriaOperand) -> CriteriaPredicate {
    match op {
        None | Some(CmpOp::Eq) => CriteriaPredicate::Eq(eq),
        Some(CmpOp::Ne) => CriteriaPredicate::Ne(eq),
        Some(CmpOp::Gt) => CriteriaPredicate::Gt(operand),
        Some(CmpOp::Ge) => CriteriaPredicate::Ge(operand),
        Some(CmpOp::Lt) => CriteriaPredicate::Lt(operand),
        Some(CmpOp::Le) => CriteriaPredicate::Le(operand),
    }
}

fn has_unescaped_wildcard(s: &str) -> bool {
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '~' => {
                chars.next();
            }
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

/// `~*` → `*`, `~?` → `?`, `~~` → `~`; any other `~` is kept.
fn unescape_wildcards(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '~' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '*' | '?' | '~') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
