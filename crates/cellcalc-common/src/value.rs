use std::fmt::{self, Display};

use crate::{ExcelError, ExcelErrorKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A resolved scalar value as seen by a function body.
///
/// Aggregate shapes (areas, multi-area lists) live one layer up in the
/// evaluator because they need a cell resolver to be read.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ExcelError),
    /// An empty cell.
    Empty,
    /// An omitted optional call argument. Distinct from `Empty` because some
    /// functions treat it as zero and others as an error.
    Missing,
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => f.write_str(&format_number(*n)),
            LiteralValue::Text(s) => write!(f, "{s}"),
            LiteralValue::Boolean(true) => f.write_str("TRUE"),
            LiteralValue::Boolean(false) => f.write_str("FALSE"),
            LiteralValue::Error(e) => write!(f, "{}", e.kind),
            LiteralValue::Empty | LiteralValue::Missing => Ok(()),
        }
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Number(n)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Boolean(b)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::Text(s.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::Text(s)
    }
}

impl LiteralValue {
    /// Blank cell (not an omitted argument).
    pub fn is_empty(&self) -> bool {
        matches!(self, LiteralValue::Empty)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, LiteralValue::Number(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LiteralValue::Error(_))
    }

    pub fn error_kind(&self) -> Option<ExcelErrorKind> {
        match self {
            LiteralValue::Error(e) => Some(e.kind),
            _ => None,
        }
    }
}

/// Render a number the way a General-formatted cell shows it: the shortest
/// text that round-trips, switching to `1.5E+21` style outside
/// `[1e-7, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if !n.is_finite() {
        return ExcelErrorKind::Num.to_string();
    }
    let magnitude = n.abs();
    if (1e-7..1e21).contains(&magnitude) {
        return format!("{n}");
    }

    let sci = format!("{n:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => sci,
    }
}
