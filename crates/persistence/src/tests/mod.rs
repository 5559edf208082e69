// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_timeline_tests;

use avkorting::{Avkorting, Command, State, TransitionResult, apply};
use avkorting_audit::{Actor, Cause};
use avkorting_domain::{
    CaseRef, CaseType, GrossBenefitPeriod, IncomeDeclaration, OffsetCalculator, OffsetEvaluation,
    Period, YearMonth,
};
use std::convert::Infallible;
use time::Month;

use crate::Persistence;

pub struct FlatOffset;

impl OffsetCalculator for FlatOffset {
    type Error = Infallible;

    fn evaluate(
        &self,
        _declaration: &IncomeDeclaration,
        _period: &Period,
    ) -> Result<OffsetEvaluation, Self::Error> {
        Ok(OffsetEvaluation {
            amount: 1000,
            trace: String::from("flat"),
        })
    }
}

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("test-actor"), String::from("system"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn register_income(from: Month) -> Command {
    Command::NewIncomeDeclaration {
        declaration: IncomeDeclaration::new(YearMonth::new(2024, from), 120_000, "test"),
        case_type: CaseType::FirstDecision,
        effective_month: YearMonth::new(2024, from),
        gross_benefit: Some(vec![GrossBenefitPeriod {
            period: Period::open(YearMonth::new(2024, Month::January)),
            amount: 16_000,
            benefit_calculation_ref: String::from("beregning-1"),
        }]),
        stop_from: None,
    }
}

pub fn apply_to(
    persistence: &Persistence,
    state: &State,
    command: Command,
) -> TransitionResult {
    apply(
        state,
        command,
        create_test_actor(),
        create_test_cause(),
        &FlatOffset,
        persistence,
    )
    .unwrap()
}

pub fn create_stored_ledger(persistence: &Persistence) -> (CaseRef, Avkorting) {
    let state: State = State::new(CaseRef::generate());
    let result: TransitionResult = apply_to(persistence, &state, register_income(Month::March));
    persistence.persist_transition(&result).unwrap();
    (state.case_ref, result.new_state.avkorting)
}
