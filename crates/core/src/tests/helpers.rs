// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Avkorting, LedgerLookup};
use avkorting_audit::{Actor, Cause};
use avkorting_domain::{
    CaseRef, CaseType, GrossBenefitPeriod, IncomeDeclaration, OffsetCalculator, OffsetEvaluation,
    Period, YearMonth,
};
use std::collections::HashMap;
use std::convert::Infallible;
use time::Month;

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("Z123456"), String::from("caseworker"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("behandling-1"), String::from("Income reported"))
}

pub const fn ym(year: i32, month: Month) -> YearMonth {
    YearMonth::new(year, month)
}

pub fn bounded(from: YearMonth, to: YearMonth) -> Period {
    Period::new(from, Some(to)).unwrap()
}

pub fn gross(period: Period, amount: i64) -> GrossBenefitPeriod {
    GrossBenefitPeriod {
        period,
        amount,
        benefit_calculation_ref: String::from("beregning-1"),
    }
}

/// 15676 for March and April 2024, 16682 from May onward.
pub fn create_test_gross_benefit() -> Vec<GrossBenefitPeriod> {
    vec![
        gross(bounded(ym(2024, Month::March), ym(2024, Month::April)), 15676),
        gross(Period::open(ym(2024, Month::May)), 16682),
    ]
}

pub fn declaration(from: YearMonth, annual_income: i64) -> IncomeDeclaration {
    IncomeDeclaration::new(from, annual_income, "test")
}

/// Offsets a tenth of the monthly declared income.
pub struct IncomeShareCalculator;

impl OffsetCalculator for IncomeShareCalculator {
    type Error = Infallible;

    fn evaluate(
        &self,
        declaration: &IncomeDeclaration,
        period: &Period,
    ) -> Result<OffsetEvaluation, Self::Error> {
        Ok(OffsetEvaluation {
            amount: declaration.annual_income / 120,
            trace: format!("income share from {}", period.from()),
        })
    }
}

/// Offsets a fixed amount and splits segments at the given months.
pub struct FixedOffsetCalculator {
    pub amount: i64,
    pub segment_starts: Vec<YearMonth>,
}

impl OffsetCalculator for FixedOffsetCalculator {
    type Error = Infallible;

    fn evaluate(
        &self,
        _declaration: &IncomeDeclaration,
        _period: &Period,
    ) -> Result<OffsetEvaluation, Self::Error> {
        Ok(OffsetEvaluation {
            amount: self.amount,
            trace: String::from("fixed"),
        })
    }

    fn segment_starts(&self, year: i32) -> Vec<YearMonth> {
        self.segment_starts
            .iter()
            .copied()
            .filter(|month| month.year() == year)
            .collect()
    }
}

#[derive(Debug)]
pub struct RuleEngineUnavailable;

impl std::fmt::Display for RuleEngineUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule engine unavailable")
    }
}

impl std::error::Error for RuleEngineUnavailable {}

pub struct FailingCalculator;

impl OffsetCalculator for FailingCalculator {
    type Error = RuleEngineUnavailable;

    fn evaluate(
        &self,
        _declaration: &IncomeDeclaration,
        _period: &Period,
    ) -> Result<OffsetEvaluation, Self::Error> {
        Err(RuleEngineUnavailable)
    }
}

#[derive(Default)]
pub struct TestLookup {
    pub ledgers: HashMap<CaseRef, Avkorting>,
}

impl LedgerLookup for TestLookup {
    type Error = Infallible;

    fn ledger_for_case(&self, case_ref: CaseRef) -> Result<Option<Avkorting>, Self::Error> {
        Ok(self.ledgers.get(&case_ref).cloned())
    }
}

pub struct FailingLookup;

impl LedgerLookup for FailingLookup {
    type Error = RuleEngineUnavailable;

    fn ledger_for_case(&self, _case_ref: CaseRef) -> Result<Option<Avkorting>, Self::Error> {
        Err(RuleEngineUnavailable)
    }
}

/// A first decision registering 120000 from March 2024 with the test gross benefit.
pub fn create_first_decision_ledger() -> Avkorting {
    Avkorting::new()
        .with_new_income_declaration(
            declaration(ym(2024, Month::March), 120_000),
            CaseType::FirstDecision,
            ym(2024, Month::March),
            &create_test_actor(),
            Some(create_test_gross_benefit().as_slice()),
            None,
            &IncomeShareCalculator,
        )
        .unwrap()
}
