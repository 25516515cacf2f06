//! Fold strategies plugged into the database scan.
//!
//! Only `LiteralValue::Number` counts as numeric here; numeric-looking text
//! and booleans in the field column are ignored by the numeric folds.

use cellcalc_common::{ExcelError, LiteralValue};

use super::scan::DatabaseAccumulator;
use crate::builtins::utils::DecimalFold;

/* ───────────────────────────── Sum ───────────────────────────── */

#[derive(Debug, Clone)]
pub struct SumAccumulator {
    decimal: bool,
    total: DecimalFold,
}

impl SumAccumulator {
    pub fn new(decimal: bool) -> Self {
        Self {
            decimal,
            total: DecimalFold::sum(decimal),
        }
    }
}

impl DatabaseAccumulator for SumAccumulator {
    fn reset(&mut self) {
        self.total = DecimalFold::sum(self.decimal);
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        if let LiteralValue::Number(n) = value {
            self.total.add(*n);
        }
        true
    }

    fn result(&self) -> LiteralValue {
        LiteralValue::Number(self.total.value())
    }
}

/* ───────────────────────────── Count ─────────────────────────── */

/// Counts numeric field cells.
#[derive(Debug, Clone, Default)]
pub struct CountAccumulator {
    count: u64,
}

impl CountAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatabaseAccumulator for CountAccumulator {
    fn reset(&mut self) {
        self.count = 0;
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        if value.is_number() {
            self.count += 1;
        }
        true
    }

    fn result(&self) -> LiteralValue {
        LiteralValue::Number(self.count as f64)
    }

    fn allow_empty_match_field(&self) -> bool {
        true
    }
}

/// Counts non-blank field cells, errors included.
#[derive(Debug, Clone, Default)]
pub struct CountAAccumulator {
    count: u64,
}

impl CountAAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatabaseAccumulator for CountAAccumulator {
    fn reset(&mut self) {
        self.count = 0;
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        match value {
            LiteralValue::Empty | LiteralValue::Missing => {}
            LiteralValue::Text(s) if s.is_empty() => {}
            _ => self.count += 1,
        }
        true
    }

    fn result(&self) -> LiteralValue {
        LiteralValue::Number(self.count as f64)
    }
}

/// Counts matching records regardless of any field; used when DCOUNT or
/// DCOUNTA is called with the field omitted.
#[derive(Debug, Clone, Default)]
pub struct RecordCountAccumulator {
    count: u64,
}

impl RecordCountAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatabaseAccumulator for RecordCountAccumulator {
    fn reset(&mut self) {
        self.count = 0;
    }

    fn process_match(&mut self, _value: &LiteralValue) -> bool {
        self.count += 1;
        true
    }

    fn result(&self) -> LiteralValue {
        LiteralValue::Number(self.count as f64)
    }

    fn allow_empty_match_field(&self) -> bool {
        true
    }

    fn counts_records(&self) -> bool {
        true
    }
}

/* ───────────────────────────── Average ───────────────────────── */

#[derive(Debug, Clone)]
pub struct AverageAccumulator {
    decimal: bool,
    total: DecimalFold,
    count: u64,
}

impl AverageAccumulator {
    pub fn new(decimal: bool) -> Self {
        Self {
            decimal,
            total: DecimalFold::sum(decimal),
            count: 0,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl DatabaseAccumulator for AverageAccumulator {
    fn reset(&mut self) {
        self.total = DecimalFold::sum(self.decimal);
        self.count = 0;
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        if let LiteralValue::Number(n) = value {
            self.total.add(*n);
            self.count += 1;
        }
        true
    }

    /// 0 when nothing numeric matched.
    fn result(&self) -> LiteralValue {
        if self.count == 0 {
            return LiteralValue::Number(0.0);
        }
        LiteralValue::Number(self.total.mean(self.count))
    }
}

/* ───────────────────────────── Min / Max ─────────────────────── */

#[derive(Debug, Clone, Default)]
pub struct MinAccumulator {
    min: Option<f64>,
}

impl MinAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatabaseAccumulator for MinAccumulator {
    fn reset(&mut self) {
        self.min = None;
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        if let LiteralValue::Number(n) = value {
            self.min = Some(self.min.map_or(*n, |m| m.min(*n)));
        }
        true
    }

    fn result(&self) -> LiteralValue {
        LiteralValue::Number(self.min.unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaxAccumulator {
    max: Option<f64>,
}

impl MaxAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatabaseAccumulator for MaxAccumulator {
    fn reset(&mut self) {
        self.max = None;
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        if let LiteralValue::Number(n) = value {
            self.max = Some(self.max.map_or(*n, |m| m.max(*n)));
        }
        true
    }

    fn result(&self) -> LiteralValue {
        LiteralValue::Number(self.max.unwrap_or(0.0))
    }
}

/* ───────────────────────────── Product ───────────────────────── */

#[derive(Debug, Clone)]
pub struct ProductAccumulator {
    decimal: bool,
    product: DecimalFold,
    seeded: bool,
}

impl ProductAccumulator {
    pub fn new(decimal: bool) -> Self {
        Self {
            decimal,
            product: DecimalFold::product(decimal),
            seeded: false,
        }
    }
}

impl DatabaseAccumulator for ProductAccumulator {
    fn reset(&mut self) {
        self.product = DecimalFold::product(self.decimal);
        self.seeded = false;
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        if let LiteralValue::Number(n) = value {
            self.product.mul(*n);
            self.seeded = true;
        }
        true
    }

    /// 0 when nothing numeric matched.
    fn result(&self) -> LiteralValue {
        if !self.seeded {
            return LiteralValue::Number(0.0);
        }
        LiteralValue::Number(self.product.value())
    }
}

/* ───────────────────────────── Get ───────────────────────────── */

/// Captures the single matching field value. A second match poisons the
/// result with `#NUM!` and stops the scan.
#[derive(Debug, Clone, Default)]
pub struct GetAccumulator {
    captured: Option<LiteralValue>,
    duplicate: bool,
}

impl GetAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatabaseAccumulator for GetAccumulator {
    fn reset(&mut self) {
        self.captured = None;
        self.duplicate = false;
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        if self.captured.is_some() {
            self.duplicate = true;
            return false;
        }
        self.captured = Some(value.clone());
        true
    }

    fn result(&self) -> LiteralValue {
        if self.duplicate {
            return LiteralValue::Error(
                ExcelError::new_num().with_message("More than one record matches the criteria"),
            );
        }
        match &self.captured {
            None => LiteralValue::Error(
                ExcelError::new_value().with_message("No record matches the criteria"),
            ),
            Some(LiteralValue::Empty) => LiteralValue::Error(
                ExcelError::new_value().with_message("Matching record has a blank field"),
            ),
            Some(v) => v.clone(),
        }
    }

    fn allow_empty_match_field(&self) -> bool {
        true
    }
}

/* ───────────────────────────── Deviation ─────────────────────── */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviationKind {
    /// Population standard deviation (DSTDEVP).
    StdevP,
    /// Sample standard deviation (DSTDEV).
    Stdev,
    /// Population variance (DVARP).
    VarP,
    /// Sample variance (DVAR).
    Var,
}

impl DeviationKind {
    fn is_sample(self) -> bool {
        matches!(self, DeviationKind::Stdev | DeviationKind::Var)
    }

    fn is_stdev(self) -> bool {
        matches!(self, DeviationKind::Stdev | DeviationKind::StdevP)
    }
}

#[derive(Debug, Clone)]
pub struct DeviationAccumulator {
    kind: DeviationKind,
    samples: Vec<f64>,
}

impl DeviationAccumulator {
    pub fn new(kind: DeviationKind) -> Self {
        Self {
            kind,
            samples: Vec::new(),
        }
    }
}

impl DatabaseAccumulator for DeviationAccumulator {
    fn reset(&mut self) {
        self.samples.clear();
    }

    fn process_match(&mut self, value: &LiteralValue) -> bool {
        if let LiteralValue::Number(n) = value {
            self.samples.push(*n);
        }
        true
    }

    fn result(&self) -> LiteralValue {
        let n = self.samples.len();
        let needed = if self.kind.is_sample() { 2 } else { 1 };
        if n < needed {
            return LiteralValue::Error(ExcelError::new_div());
        }
        let mean = self.samples.iter().sum::<f64>() / n as f64;
        let sum_sq: f64 = self.samples.iter().map(|x| (x - mean).powi(2)).sum();
        let denom = if self.kind.is_sample() { n - 1 } else { n };
        let variance = sum_sq / denom as f64;
        LiteralValue::Number(if self.kind.is_stdev() {
            variance.sqrt()
        } else {
            variance
        })
    }
}
