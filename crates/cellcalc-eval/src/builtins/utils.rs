use std::cmp::Ordering;
use std::sync::LazyLock;

use cellcalc_common::LiteralValue;
use rust_decimal::Decimal;

use crate::args::{ArgSchema, CriteriaOperand, CriteriaPredicate};
use crate::coercion::parse_double;

// ─────────────────────────────── criteria matching ───────────────────────────────

/// Test one cell against a parsed criterion.
///
/// Error cells only satisfy an error criterion of the same kind (or `<>`
/// one of a different kind). Text compares case-insensitively; numeric
/// criteria also accept text that parses as a number.
pub fn criteria_match(pred: &CriteriaPredicate, cell: &LiteralValue) -> bool {
    if let LiteralValue::Error(ce) = cell {
        return match pred {
            CriteriaPredicate::Eq(LiteralValue::Error(e)) => e.kind == ce.kind,
            CriteriaPredicate::Ne(LiteralValue::Error(e)) => e.kind != ce.kind,
            _ => false,
        };
    }
    match pred {
        CriteriaPredicate::IsBlank => is_blank(cell),
        CriteriaPredicate::IsNonBlank => !is_blank(cell),
        CriteriaPredicate::Eq(v) => values_equal(cell, v),
        CriteriaPredicate::Ne(v) => !values_equal(cell, v),
        CriteriaPredicate::Gt(op) => compare(cell, op) == Some(Ordering::Greater),
        CriteriaPredicate::Ge(op) => {
            matches!(compare(cell, op), Some(Ordering::Greater | Ordering::Equal))
        }
        CriteriaPredicate::Lt(op) => compare(cell, op) == Some(Ordering::Less),
        CriteriaPredicate::Le(op) => {
            matches!(compare(cell, op), Some(Ordering::Less | Ordering::Equal))
        }
    }
}

fn is_blank(v: &LiteralValue) -> bool {
    match v {
        LiteralValue::Empty | LiteralValue::Missing => true,
        LiteralValue::Text(s) => s.is_empty(),
        _ => false,
    }
}

fn cell_number(v: &LiteralValue) -> Option<f64> {
    match v {
        LiteralValue::Number(n) => Some(*n),
        LiteralValue::Text(s) => {
            let n = parse_double(s);
            (!n.is_nan()).then_some(n)
        }
        _ => None,
    }
}

fn values_equal(cell: &LiteralValue, target: &LiteralValue) -> bool {
    match target {
        LiteralValue::Number(n) => cell_number(cell) == Some(*n),
        LiteralValue::Text(t) => match cell {
            LiteralValue::Text(s) => eq_ignore_case(s, t),
            LiteralValue::Empty | LiteralValue::Missing => t.is_empty(),
            _ => false,
        },
        LiteralValue::Boolean(b) => matches!(cell, LiteralValue::Boolean(c) if c == b),
        LiteralValue::Empty | LiteralValue::Missing => is_blank(cell),
        LiteralValue::Error(_) => false,
    }
}

fn compare(cell: &LiteralValue, operand: &CriteriaOperand) -> Option<Ordering> {
    match operand {
        CriteriaOperand::Number(n) => cell_number(cell)?.partial_cmp(n),
        CriteriaOperand::Text(t) => match cell {
            LiteralValue::Text(s) if parse_double(s).is_nan() => {
                Some(s.to_lowercase().cmp(&t.to_lowercase()))
            }
            _ => None,
        },
    }
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

// ─────────────────────────────── exact folds ───────────────────────────────

/// Running sum or product kept in base-10 decimal arithmetic when possible,
/// so that `0.1 + 0.2` accumulates to exactly `0.3`.
///
/// Falls back to the plain `f64` fold once any input (or intermediate)
/// leaves the range `Decimal` can represent without rounding.
#[derive(Debug, Clone)]
pub struct DecimalFold {
    exact: Option<Decimal>,
    approx: f64,
}

impl DecimalFold {
    pub fn sum(decimal: bool) -> Self {
        Self {
            exact: decimal.then_some(Decimal::ZERO),
            approx: 0.0,
        }
    }

    pub fn product(decimal: bool) -> Self {
        Self {
            exact: decimal.then_some(Decimal::ONE),
            approx: 1.0,
        }
    }

    pub fn add(&mut self, x: f64) {
        self.approx += x;
        self.exact = self
            .exact
            .and_then(|d| to_decimal(x).and_then(|dx| d.checked_add(dx)));
    }

    pub fn mul(&mut self, x: f64) {
        self.approx *= x;
        self.exact = self
            .exact
            .and_then(|d| to_decimal(x).and_then(|dx| d.checked_mul(dx)));
    }

    pub fn value(&self) -> f64 {
        self.exact.and_then(from_decimal).unwrap_or(self.approx)
    }

    /// `value() / count`, divided in decimal when the fold is still exact.
    pub fn mean(&self, count: u64) -> f64 {
        self.exact
            .and_then(|d| d.checked_div(Decimal::from(count)))
            .and_then(from_decimal)
            .unwrap_or(self.approx / count as f64)
    }
}

/// Shortest round-trip text of `x` read as a decimal; rejected when it does
/// not convert back to the same `f64`.
fn to_decimal(x: f64) -> Option<Decimal> {
    if !x.is_finite() {
        return None;
    }
    let d: Decimal = x.to_string().parse().ok()?;
    (from_decimal(d) == Some(x)).then_some(d)
}

fn from_decimal(d: Decimal) -> Option<f64> {
    d.to_string().parse::<f64>().ok()
}

// ─────────────────────────────── ArgSchema presets ───────────────────────────────

/// Two numeric scalar arguments, with lenient text-to-number coercion.
pub static ARG_NUM_LENIENT_TWO: LazyLock<Vec<ArgSchema>> = LazyLock::new(|| {
    vec![
        ArgSchema::number_lenient_scalar(),
        ArgSchema::number_lenient_scalar(),
    ]
});

/// `(database, field, criteria)` for the D-functions.
pub static ARG_DATABASE: LazyLock<Vec<ArgSchema>> =
    LazyLock::new(|| vec![ArgSchema::range(), ArgSchema::any(), ArgSchema::range()]);

/// `(range, criteria, [value_range])` for SUMIF and friends.
pub static ARG_RANGE_CRITERIA_OPT_RANGE: LazyLock<Vec<ArgSchema>> = LazyLock::new(|| {
    vec![
        ArgSchema::range(),
        ArgSchema::any(),
        ArgSchema::range().optional(None),
    ]
});

/// Optional single reference, as taken by `ROW` / `COLUMN`.
pub static ARG_OPT_REF: LazyLock<Vec<ArgSchema>> =
    LazyLock::new(|| vec![ArgSchema::range().optional(None)]);
