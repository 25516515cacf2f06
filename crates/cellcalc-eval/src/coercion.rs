//! Operand resolution and scalar coercion.
//!
//! Two failure conventions coexist on purpose and callers branch on them:
//! - [`parse_double`] returns the NaN sentinel for bad input;
//! - every `coerce_*` function returns a typed `Err(ExcelError)`.
//!
//! Error-valued inputs are handed back unchanged in the `Err` arm.

use cellcalc_common::{ExcelError, LiteralValue, format_number};

use crate::traits::{AreaRef, CalcValue, FunctionContext};

/* ───────────────────────── implicit intersection ───────────────────────── */

/// Reduce an argument to one scalar as seen from the formula at `(row, col)`.
///
/// Scalars (errors included) come back unchanged. Areas use implicit
/// intersection: a single-column area yields the cell on the calling row,
/// a single-row area the cell in the calling column, and a 2-D area the
/// calling cell itself. Anything else is `#VALUE!`.
pub fn get_single_value(
    value: &CalcValue<'_>,
    row: u32,
    col: u32,
) -> Result<LiteralValue, ExcelError> {
    match value {
        CalcValue::Scalar(v) => Ok(v.clone()),
        CalcValue::Area(area) => choose_single_element(area, row, col),
        CalcValue::List(areas) => match areas.as_slice() {
            [area] => choose_single_element(area, row, col),
            _ => Err(ExcelError::new_value()
                .with_message("Multi-area reference cannot be used as a single value")),
        },
    }
}

fn choose_single_element(
    area: &AreaRef<'_>,
    row: u32,
    col: u32,
) -> Result<LiteralValue, ExcelError> {
    let addr = area.address();
    if addr.is_single_cell() {
        return Ok(area.get_relative(0, 0));
    }
    if addr.is_column() {
        if addr.contains_row(row) {
            return Ok(area.get_absolute(row, addr.first_col));
        }
        return Err(intersection_failed(row, col));
    }
    if addr.is_row() {
        if addr.contains_col(col) {
            return Ok(area.get_absolute(addr.first_row, col));
        }
        return Err(intersection_failed(row, col));
    }
    if addr.contains(row, col) {
        return Ok(area.get_absolute(row, col));
    }
    Err(intersection_failed(row, col))
}

fn intersection_failed(row: u32, col: u32) -> ExcelError {
    ExcelError::new_value()
        .with_message("Implicit intersection failed")
        .with_location(row, col)
}

/* ───────────────────────────── coercions ───────────────────────────── */

/// Strict decimal literal parser. Returns NaN on any failure.
///
/// Accepts surrounding ASCII whitespace, one optional sign, digits with an
/// optional decimal point, and an optional exponent. Thousands separators,
/// currency symbols, `inf`/`nan` spellings and overflowing magnitudes are
/// all rejected.
pub fn parse_double(s: &str) -> f64 {
    let trimmed = s.trim_matches(|c: char| c.is_ascii_whitespace());
    if !is_decimal_literal(trimmed) {
        return f64::NAN;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => f64::NAN,
    }
}

fn is_decimal_literal(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i = 1;
    }

    let mut digits = 0usize;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return false;
    }

    if i < b.len() && matches!(b[i], b'e' | b'E') {
        i += 1;
        if matches!(b.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == b.len()
}

/// Number context: text must be a decimal literal, TRUE/FALSE are 1/0,
/// blanks and omitted arguments are 0.
pub fn coerce_to_number(value: &LiteralValue) -> Result<f64, ExcelError> {
    match value {
        LiteralValue::Number(n) => Ok(*n),
        LiteralValue::Text(s) => {
            let n = parse_double(s);
            if n.is_nan() {
                Err(ExcelError::new_value()
                    .with_message(format!("Cannot convert '{s}' to a number")))
            } else {
                Ok(n)
            }
        }
        LiteralValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        LiteralValue::Empty | LiteralValue::Missing => Ok(0.0),
        LiteralValue::Error(e) => Err(e.clone()),
    }
}

/// Text context.
pub fn coerce_to_text(value: &LiteralValue) -> Result<String, ExcelError> {
    match value {
        LiteralValue::Text(s) => Ok(s.clone()),
        LiteralValue::Number(n) => Ok(number_to_text(*n)),
        LiteralValue::Boolean(true) => Ok("TRUE".to_string()),
        LiteralValue::Boolean(false) => Ok("FALSE".to_string()),
        LiteralValue::Empty | LiteralValue::Missing => Ok(String::new()),
        LiteralValue::Error(e) => Err(e.clone()),
    }
}

/// Integer context: number coercion, then truncation toward zero.
pub fn coerce_to_int(value: &LiteralValue) -> Result<i32, ExcelError> {
    let n = coerce_to_number(value)?;
    if !n.is_finite() {
        return Err(ExcelError::new_value().with_message("Number is not finite"));
    }
    let t = n.trunc();
    if t < i32::MIN as f64 || t > i32::MAX as f64 {
        return Err(ExcelError::new_value().with_message(format!("{t} is out of integer range")));
    }
    Ok(t as i32)
}

/// Boolean context.
///
/// `Ok(None)` means "could not coerce" and only arises for a blank cell when
/// `default_when_blank` is `None`. Omitted arguments are `false`.
pub fn coerce_to_bool(
    value: &LiteralValue,
    default_when_blank: Option<bool>,
) -> Result<Option<bool>, ExcelError> {
    match value {
        LiteralValue::Boolean(b) => Ok(Some(*b)),
        LiteralValue::Number(n) => Ok(Some(*n != 0.0)),
        LiteralValue::Text(s) => {
            if s.eq_ignore_ascii_case("TRUE") {
                Ok(Some(true))
            } else if s.eq_ignore_ascii_case("FALSE") {
                Ok(Some(false))
            } else {
                Err(ExcelError::new_value()
                    .with_message(format!("Cannot convert '{s}' to a logical value")))
            }
        }
        LiteralValue::Empty => Ok(default_when_blank),
        LiteralValue::Missing => Ok(Some(false)),
        LiteralValue::Error(e) => Err(e.clone()),
    }
}

/// Canonical text for a number (shortest round-trip).
pub fn number_to_text(n: f64) -> String {
    format_number(n)
}

/* ──────────────────────── argument conveniences ───────────────────────── */

pub fn arg_to_number(arg: &CalcValue<'_>, ctx: &FunctionContext) -> Result<f64, ExcelError> {
    coerce_to_number(&get_single_value(arg, ctx.row, ctx.col)?)
}

pub fn arg_to_int(arg: &CalcValue<'_>, ctx: &FunctionContext) -> Result<i32, ExcelError> {
    coerce_to_int(&get_single_value(arg, ctx.row, ctx.col)?)
}

pub fn arg_to_text(arg: &CalcValue<'_>, ctx: &FunctionContext) -> Result<String, ExcelError> {
    coerce_to_text(&get_single_value(arg, ctx.row, ctx.col)?)
}

pub fn arg_to_bool(
    arg: &CalcValue<'_>,
    ctx: &FunctionContext,
    default_when_blank: Option<bool>,
) -> Result<Option<bool>, ExcelError> {
    coerce_to_bool(&get_single_value(arg, ctx.row, ctx.col)?, default_when_blank)
}

/// Converts NaN / infinities produced by numeric recipes into `#NUM!`.
pub fn sanitize_numeric(n: f64) -> Result<f64, ExcelError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ExcelError::new_num())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_workbook::TestWorkbook;
    use cellcalc_common::{AreaAddress, ExcelErrorKind};

    fn column_book() -> TestWorkbook {
        // A3:A7 = 30, 40, 50, 60, 70
        TestWorkbook::new().with_range(
            "Sheet1",
            3,
            1,
            (3..=7)
                .map(|r| vec![LiteralValue::Number(r as f64 * 10.0)])
                .collect(),
        )
    }

    #[test]
    fn parse_double_accepts_plain_decimals_only() {
        assert_eq!(parse_double("42"), 42.0);
        assert_eq!(parse_double("  -1.5e3 "), -1500.0);
        assert_eq!(parse_double("+.5"), 0.5);
        assert_eq!(parse_double("7."), 7.0);
        assert_eq!(parse_double("1E+2"), 100.0);
        for bad in ["", " ", "abc", "1,000", "$5", "1e", "--1", ".", "inf", "NaN", "1e999", "0x10"] {
            assert!(parse_double(bad).is_nan(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn number_coercion_rules() {
        assert_eq!(coerce_to_number(&LiteralValue::Boolean(true)), Ok(1.0));
        assert_eq!(coerce_to_number(&LiteralValue::Empty), Ok(0.0));
        assert_eq!(coerce_to_number(&LiteralValue::Missing), Ok(0.0));
        assert_eq!(coerce_to_number(&LiteralValue::Text("2.5".into())), Ok(2.5));
        let err = coerce_to_number(&LiteralValue::Text("abc".into())).unwrap_err();
        assert_eq!(err.kind, ExcelErrorKind::Value);
    }

    #[test]
    fn errors_pass_through_every_coercion_unchanged() {
        for kind in ExcelErrorKind::ALL {
            let original = ExcelError::new(kind).with_message("origin");
            let v = LiteralValue::Error(original.clone());
            assert_eq!(coerce_to_number(&v).unwrap_err(), original);
            assert_eq!(coerce_to_text(&v).unwrap_err(), original);
            assert_eq!(coerce_to_int(&v).unwrap_err(), original);
            assert_eq!(coerce_to_bool(&v, Some(true)).unwrap_err(), original);
        }
    }

    #[test]
    fn text_and_int_and_bool_coercion() {
        assert_eq!(coerce_to_text(&LiteralValue::Number(30.0)).unwrap(), "30");
        assert_eq!(coerce_to_text(&LiteralValue::Number(0.1)).unwrap(), "0.1");
        assert_eq!(coerce_to_text(&LiteralValue::Boolean(false)).unwrap(), "FALSE");
        assert_eq!(coerce_to_text(&LiteralValue::Empty).unwrap(), "");
        assert_eq!(coerce_to_text(&LiteralValue::Missing), Ok(String::new()));
        assert_eq!(
            arg_to_text(&CalcValue::Scalar(LiteralValue::Missing), &FunctionContext::new(1, 1)),
            Ok(String::new())
        );

        assert_eq!(coerce_to_int(&LiteralValue::Number(-2.9)), Ok(-2));
        assert_eq!(coerce_to_int(&LiteralValue::Text("3.7".into())), Ok(3));
        assert!(coerce_to_int(&LiteralValue::Number(f64::INFINITY)).is_err());
        assert!(coerce_to_int(&LiteralValue::Number(1e12)).is_err());

        assert_eq!(coerce_to_bool(&LiteralValue::Text("true".into()), None), Ok(Some(true)));
        assert_eq!(coerce_to_bool(&LiteralValue::Number(0.0), None), Ok(Some(false)));
        assert_eq!(coerce_to_bool(&LiteralValue::Empty, None), Ok(None));
        assert_eq!(coerce_to_bool(&LiteralValue::Empty, Some(true)), Ok(Some(true)));
        assert_eq!(coerce_to_bool(&LiteralValue::Missing, Some(true)), Ok(Some(false)));
        assert!(coerce_to_bool(&LiteralValue::Text("yes".into()), None).is_err());
    }

    #[test]
    fn implicit_intersection_column_selects_calling_row() {
        let wb = column_book();
        let arg = CalcValue::Area(wb.area_a1("A3:A7"));
        assert_eq!(get_single_value(&arg, 5, 3), Ok(LiteralValue::Number(50.0)));

        let err = get_single_value(&arg, 9, 3).unwrap_err();
        assert_eq!(err.kind, ExcelErrorKind::Value);
    }

    #[test]
    fn implicit_intersection_row_and_block_shapes() {
        let wb = TestWorkbook::new()
            .with_cell("Sheet1", 1, 3, LiteralValue::Number(7.0))
            .with_cell("Sheet1", 4, 2, LiteralValue::Text("hit".into()));

        let row = CalcValue::Area(wb.area_a1("A1:E1"));
        assert_eq!(get_single_value(&row, 8, 3), Ok(LiteralValue::Number(7.0)));
        assert!(get_single_value(&row, 8, 6).is_err());

        let block = CalcValue::Area(wb.area_a1("A2:C6"));
        assert_eq!(
            get_single_value(&block, 4, 2),
            Ok(LiteralValue::Text("hit".into()))
        );
        assert!(get_single_value(&block, 7, 2).is_err());

        let single = CalcValue::Area(wb.area_a1("C1"));
        assert_eq!(get_single_value(&single, 100, 100), Ok(LiteralValue::Number(7.0)));
    }

    #[test]
    fn lists_must_be_singletons() {
        let wb = column_book();
        let one = CalcValue::List(vec![wb.area_a1("A3:A7")]);
        assert_eq!(get_single_value(&one, 4, 1), Ok(LiteralValue::Number(40.0)));

        let two = CalcValue::List(vec![wb.area_a1("A3:A4"), wb.area_a1("A6:A7")]);
        assert!(get_single_value(&two, 4, 1).is_err());
    }

    #[test]
    fn scalars_are_returned_unchanged() {
        let e = LiteralValue::Error(ExcelError::new_na());
        assert_eq!(get_single_value(&CalcValue::Scalar(e.clone()), 1, 1), Ok(e));
        assert_eq!(
            get_single_value(&CalcValue::Scalar(LiteralValue::Missing), 1, 1),
            Ok(LiteralValue::Missing)
        );
    }

    #[test]
    fn unset_cells_read_as_blank() {
        let wb = TestWorkbook::new();
        let area = wb.area(AreaAddress::new(1, 1, 3, 1).unwrap());
        let ctx = FunctionContext::new(2, 4);
        assert_eq!(arg_to_number(&CalcValue::Area(area), &ctx), Ok(0.0));
    }

    #[test]
    fn argument_helpers_intersect_then_coerce() {
        let wb = column_book()
            .with_cell("Sheet1", 4, 2, LiteralValue::Text("true".into()))
            .with_cell("Sheet1", 5, 2, LiteralValue::Text("-2.9".into()));
        let ctx = FunctionContext::new(5, 3);
        let a = CalcValue::Area(wb.area_a1("A3:A7"));
        assert_eq!(arg_to_text(&a, &ctx), Ok("50".to_string()));
        assert_eq!(arg_to_int(&CalcValue::Area(wb.area_a1("B5")), &ctx), Ok(-2));
        assert_eq!(
            arg_to_bool(&CalcValue::Area(wb.area_a1("B4")), &ctx, None),
            Ok(Some(true))
        );
        assert_eq!(
            arg_to_bool(&CalcValue::Area(wb.area_a1("B9")), &ctx, None),
            Ok(None)
        );
        let outside = FunctionContext::new(9, 3);
        assert_eq!(
            arg_to_text(&a, &outside).unwrap_err().kind,
            ExcelErrorKind::Value
        );
    }
}
