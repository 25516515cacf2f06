//! End-to-end calls through `FunctionRegistry::evaluate`.

use crate::config::{EvalConfig, WildcardPolicy};
use crate::function_registry::FunctionRegistry;
use crate::test_workbook::TestWorkbook;
use crate::traits::{CalcValue, FunctionContext};
use cellcalc_common::{ExcelErrorKind, LiteralValue};

fn t(s: &str) -> LiteralValue {
    LiteralValue::Text(s.into())
}

fn n(x: f64) -> LiteralValue {
    LiteralValue::Number(x)
}

fn s(v: LiteralValue) -> CalcValue<'static> {
    CalcValue::Scalar(v)
}

/// Fruit table in A1:B4, criteria blocks in D1:D2 (Apple) and F1:F2 (Pear).
fn fruit_book() -> TestWorkbook {
    TestWorkbook::new()
        .with_range(
            "Sheet1",
            1,
            1,
            vec![
                vec![t("Fruit"), t("Amount")],
                vec![t("Apple"), n(10.0)],
                vec![t("Apple"), n(20.0)],
                vec![t("Pear"), n(5.0)],
            ],
        )
        .with_range("Sheet1", 1, 4, vec![vec![t("Fruit")], vec![t("Apple")]])
        .with_range("Sheet1", 1, 6, vec![vec![t("Fruit")], vec![t("Pear")]])
}

fn dfunc(
    registry: &FunctionRegistry,
    wb: &TestWorkbook,
    name: &str,
    field: LiteralValue,
    criteria: &str,
) -> LiteralValue {
    let args = vec![
        CalcValue::Area(wb.area_a1("A1:B4")),
        s(field),
        CalcValue::Area(wb.area_a1(criteria)),
    ];
    registry.evaluate(name, &args, 20, 20)
}

#[test]
fn dsum_over_apples() {
    let registry = FunctionRegistry::with_builtins();
    let wb = fruit_book();
    assert_eq!(dfunc(&registry, &wb, "DSUM", t("Amount"), "D1:D2"), n(30.0));
    assert_eq!(dfunc(&registry, &wb, "dsum", t(" amount "), "D1:D2"), n(30.0));
}

#[test]
fn dget_unique_and_duplicate_matches() {
    let registry = FunctionRegistry::with_builtins();
    let wb = fruit_book();
    assert_eq!(dfunc(&registry, &wb, "DGET", t("Amount"), "F1:F2"), n(5.0));
    assert_eq!(
        dfunc(&registry, &wb, "DGET", t("Amount"), "D1:D2").error_kind(),
        Some(ExcelErrorKind::Num)
    );
}

#[test]
fn empty_match_set_results() {
    let registry = FunctionRegistry::with_builtins();
    let wb = fruit_book().with_range("Sheet1", 1, 8, vec![vec![t("Fruit")], vec![t("Kiwi")]]);
    for name in ["DSUM", "DCOUNT", "DMIN", "DMAX", "DPRODUCT", "DAVERAGE"] {
        assert_eq!(dfunc(&registry, &wb, name, t("Amount"), "H1:H2"), n(0.0), "{name}");
    }
    assert_eq!(
        dfunc(&registry, &wb, "DGET", t("Amount"), "H1:H2").error_kind(),
        Some(ExcelErrorKind::Value)
    );
}

#[test]
fn invalid_field_selector_aborts() {
    let registry = FunctionRegistry::with_builtins();
    let wb = fruit_book();
    for field in [t("Price"), n(0.0), n(3.0), LiteralValue::Boolean(true)] {
        assert_eq!(
            dfunc(&registry, &wb, "DSUM", field.clone(), "D1:D2").error_kind(),
            Some(ExcelErrorKind::Value),
            "{field:?}"
        );
    }
    let na = LiteralValue::Error(cellcalc_common::ExcelError::new_na());
    assert_eq!(
        dfunc(&registry, &wb, "DSUM", na, "D1:D2").error_kind(),
        Some(ExcelErrorKind::Na)
    );
}

#[test]
fn implicit_intersection_through_choose() {
    let registry = FunctionRegistry::with_builtins();
    let wb = TestWorkbook::new().with_range(
        "Sheet1",
        3,
        1,
        (3..=7).map(|r| vec![n(r as f64 * 100.0)]).collect(),
    );
    let args = vec![s(n(1.0)), CalcValue::Area(wb.area_a1("A3:A7"))];
    assert_eq!(registry.evaluate("CHOOSE", &args, 5, 2), n(500.0));
    assert_eq!(
        registry.evaluate("CHOOSE", &args, 9, 2).error_kind(),
        Some(ExcelErrorKind::Value)
    );
}

#[test]
fn averageif_uses_decimal_division() {
    let registry = FunctionRegistry::with_builtins();
    let wb = TestWorkbook::new().with_range(
        "Sheet1",
        1,
        1,
        vec![
            vec![t("k"), n(1.1)],
            vec![t("k"), n(2.2)],
            vec![t("k"), n(3.3)],
        ],
    );
    let args = vec![
        CalcValue::Area(wb.area_a1("A1:A3")),
        s(t("k")),
        CalcValue::Area(wb.area_a1("B1:B3")),
    ];
    assert_eq!(registry.evaluate("AVERAGEIF", &args, 1, 5), n(2.2));

    let plain = FunctionContext::new(1, 5).with_config(EvalConfig {
        decimal_aggregation: false,
        ..EvalConfig::default()
    });
    assert_eq!(
        registry.evaluate_with("AVERAGEIF", &args, &plain),
        n((1.1 + 2.2 + 3.3) / 3.0)
    );
}

#[test]
fn wildcard_policy_reaches_database_scan() {
    let registry = FunctionRegistry::with_builtins();
    let wb = fruit_book().with_range("Sheet1", 1, 8, vec![vec![t("Fruit")], vec![t("P*")]]);
    let args = vec![
        CalcValue::Area(wb.area_a1("A1:B4")),
        s(t("Amount")),
        CalcValue::Area(wb.area_a1("H1:H2")),
    ];
    assert_eq!(
        registry.evaluate("DSUM", &args, 1, 1).error_kind(),
        Some(ExcelErrorKind::NImpl)
    );
    let literal = FunctionContext::new(1, 1).with_config(EvalConfig {
        wildcard_policy: WildcardPolicy::Literal,
        ..EvalConfig::default()
    });
    assert_eq!(registry.evaluate_with("DSUM", &args, &literal), n(0.0));
}

#[test]
fn scalar_clients_dispatch_by_name() {
    let registry = FunctionRegistry::with_builtins();
    assert_eq!(registry.evaluate("CEILING", &[s(n(2.5)), s(n(1.0))], 1, 1), n(3.0));
    assert_eq!(registry.evaluate("ROW", &[], 12, 3), n(12.0));
    assert_eq!(registry.evaluate("COLUMN", &[], 12, 3), n(3.0));
    let pmt = registry.evaluate("PMT", &[s(n(0.0)), s(t("4")), s(n(100.0))], 1, 1);
    assert_eq!(pmt, n(-25.0));
    assert_eq!(
        registry.evaluate("PMT", &[s(n(0.1)), s(t("four")), s(n(100.0))], 1, 1).error_kind(),
        Some(ExcelErrorKind::Value)
    );
    assert_eq!(
        registry.evaluate("NORMDIST", &[s(n(1.0))], 1, 1).error_kind(),
        Some(ExcelErrorKind::Name)
    );
}

#[test]
fn too_few_arguments_is_value_error() {
    let registry = FunctionRegistry::with_builtins();
    for name in ["DSUM", "CHOOSE", "CEILING", "PMT", "IPMT", "SUMIF"] {
        assert_eq!(
            registry.evaluate(name, &[s(n(1.0))], 1, 1).error_kind(),
            Some(ExcelErrorKind::Value),
            "{name}"
        );
    }
}
