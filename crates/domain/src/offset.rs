// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contract to the external rule evaluator that turns an income
//! declaration into a monthly offset amount.

use crate::period::{Period, YearMonth};
use crate::types::{IncomeDeclaration, IncomeOffsetPeriod};

/// The evaluator's answer for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetEvaluation {
    /// Monthly offset amount for the segment.
    pub amount: i64,
    /// Opaque trace of the rules applied.
    pub trace: String,
}

/// External evaluator of the statutory offset formula.
///
/// Implementations hold no temporal logic; the builder calls
/// [`OffsetCalculator::evaluate`] once per contiguous segment of a
/// declaration's validity within the year being settled. Failures are
/// returned to the caller untouched.
pub trait OffsetCalculator {
    /// Error reported by the evaluator.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the offset for `declaration` over `period`.
    ///
    /// # Errors
    ///
    /// Returns the evaluator's own error when it cannot produce an amount.
    fn evaluate(
        &self,
        declaration: &IncomeDeclaration,
        period: &Period,
    ) -> Result<OffsetEvaluation, Self::Error>;

    /// Months within `year` at which the evaluator's inputs change
    /// (e.g. statutory base amount regulation). Segments are split there.
    fn segment_starts(&self, year: i32) -> Vec<YearMonth> {
        let _ = year;
        Vec::new()
    }
}

/// Evaluates `declaration` over `validity`, split at the calculator's
/// segment starts.
pub(crate) fn evaluate_segments<C: OffsetCalculator>(
    calculator: &C,
    declaration: &IncomeDeclaration,
    validity: Period,
) -> Result<Vec<IncomeOffsetPeriod>, C::Error> {
    let year: i32 = validity.from().year();
    let mut starts: Vec<YearMonth> = calculator
        .segment_starts(year)
        .into_iter()
        .filter(|month| *month > validity.from() && validity.contains(*month))
        .collect();
    starts.sort_unstable();
    starts.dedup();

    let mut segments: Vec<Period> = Vec::with_capacity(starts.len() + 1);
    let mut from: YearMonth = validity.from();
    for start in starts {
        segments.push(Period::bounded(from, start.previous()));
        from = start;
    }
    segments.push(match validity.to() {
        Some(to) => Period::bounded(from, to),
        None => Period::open(from),
    });

    segments
        .into_iter()
        .map(|segment| {
            let evaluation: OffsetEvaluation = calculator.evaluate(declaration, &segment)?;
            Ok(IncomeOffsetPeriod {
                period: segment,
                amount: evaluation.amount,
                rule_trace: evaluation.trace,
            })
        })
        .collect()
}
