// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A linear stand-in for the statutory offset evaluator.

use avkorting_domain::{
    IncomeDeclaration, OffsetCalculator, OffsetEvaluation, Period, YearMonth, divide_rounded,
};
use std::convert::Infallible;
use time::Month;

/// Offsets a percentage of the income above an exempt amount, spread over
/// the entitled months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearOffsetCalculator {
    /// Share of the income above the exempt amount that is offset.
    pub rate_percent: i64,
    /// Annual income that is never offset.
    pub exempt_amount: i64,
    /// Month in which the base amount is regulated each year.
    pub regulation_month: Month,
}

impl LinearOffsetCalculator {
    fn countable_income(&self, declaration: &IncomeDeclaration) -> i64 {
        let domestic: i64 = (declaration.annual_income - declaration.year_deduction).max(0);
        let foreign: i64 = (declaration.foreign_income - declaration.foreign_year_deduction).max(0);
        (domestic + foreign - self.exempt_amount).max(0)
    }
}

impl OffsetCalculator for LinearOffsetCalculator {
    type Error = Infallible;

    fn evaluate(
        &self,
        declaration: &IncomeDeclaration,
        period: &Period,
    ) -> Result<OffsetEvaluation, Self::Error> {
        let countable: i64 = self.countable_income(declaration);
        let months: i64 = i64::from(declaration.entitled_months.max(1));
        let amount: i64 = divide_rounded(countable.saturating_mul(self.rate_percent), 100 * months);

        Ok(OffsetEvaluation {
            amount,
            trace: format!(
                "{}: ({countable} * {}%) / {months} months = {amount}",
                period.from(),
                self.rate_percent
            ),
        })
    }

    fn segment_starts(&self, year: i32) -> Vec<YearMonth> {
        vec![YearMonth::new(year, self.regulation_month)]
    }
}
