//! CHOOSE function - selects a value from a list based on an index
//!
//! Excel semantics:
//! - CHOOSE(index_num, value1, [value2], ...)
//! - index_num is truncated and must be between 1 and the number of values
//! - Only the chosen argument is reduced to a value

use std::sync::{Arc, LazyLock};

use cellcalc_common::{ExcelError, LiteralValue};
use cellcalc_macros::func_caps;

use crate::args::ArgSchema;
use crate::coercion::{arg_to_number, get_single_value};
use crate::function::Function;
use crate::function_registry::FunctionRegistry;
use crate::traits::{CalcValue, FunctionContext};

#[derive(Debug)]
pub struct ChooseFn;

impl Function for ChooseFn {
    fn name(&self) -> &'static str {
        "CHOOSE"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn variadic(&self) -> bool {
        true
    }

    func_caps!(PURE, LOOKUP);

    fn arg_schema(&self) -> &'static [ArgSchema] {
        static SCHEMA: LazyLock<Vec<ArgSchema>> = LazyLock::new(|| {
            vec![
                // index_num
                ArgSchema::number_lenient_scalar(),
                // value1, value2, ...
                ArgSchema::any(),
            ]
        });
        &SCHEMA
    }

    fn eval_scalar<'a>(
        &self,
        args: &[CalcValue<'a>],
        ctx: &FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let index = arg_to_number(&args[0], ctx)?.trunc();
        let choices = &args[1..];
        if index < 1.0 || index > choices.len() as f64 {
            return Err(ExcelError::new_value().with_message(format!(
                "CHOOSE index {index} is outside 1..={}",
                choices.len()
            )));
        }
        let chosen = &choices[index as usize - 1];
        if chosen.is_missing() {
            return Ok(LiteralValue::Empty);
        }
        get_single_value(chosen, ctx.row, ctx.col)
    }
}

pub fn register_builtins(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(ChooseFn));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_workbook::TestWorkbook;
    use cellcalc_common::ExcelErrorKind;

    fn s(v: LiteralValue) -> CalcValue<'static> {
        CalcValue::Scalar(v)
    }

    #[test]
    fn picks_by_truncated_index() {
        let args = vec![
            s(LiteralValue::Number(2.9)),
            s(LiteralValue::Text("a".into())),
            s(LiteralValue::Text("b".into())),
        ];
        assert_eq!(
            ChooseFn.dispatch(&args, &FunctionContext::new(1, 1)),
            LiteralValue::Text("b".into())
        );
    }

    #[test]
    fn index_out_of_range_or_bad() {
        let ctx = FunctionContext::new(1, 1);
        for idx in [0.0, 3.0, -1.0] {
            let args = vec![
                s(LiteralValue::Number(idx)),
                s(LiteralValue::Number(1.0)),
                s(LiteralValue::Number(2.0)),
            ];
            assert_eq!(
                ChooseFn.dispatch(&args, &ctx).error_kind(),
                Some(ExcelErrorKind::Value)
            );
        }
        let args = vec![
            s(LiteralValue::Error(ExcelError::new_na())),
            s(LiteralValue::Number(1.0)),
        ];
        assert_eq!(ChooseFn.dispatch(&args, &ctx).error_kind(), Some(ExcelErrorKind::Na));
    }

    #[test]
    fn chosen_reference_is_intersected() {
        let wb = TestWorkbook::new().with_range(
            "Sheet1",
            1,
            1,
            vec![
                vec![LiteralValue::Number(1.0)],
                vec![LiteralValue::Number(2.0)],
                vec![LiteralValue::Number(3.0)],
            ],
        );
        let args = vec![
            s(LiteralValue::Number(1.0)),
            CalcValue::Area(wb.area_a1("A1:A3")),
            s(LiteralValue::Missing),
        ];
        assert_eq!(
            ChooseFn.dispatch(&args, &FunctionContext::new(3, 2)),
            LiteralValue::Number(3.0)
        );
        let mut second = args.clone();
        second[0] = s(LiteralValue::Number(2.0));
        assert_eq!(
            ChooseFn.dispatch(&second, &FunctionContext::new(3, 2)),
            LiteralValue::Empty
        );
    }
}
