// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    FailingCalculator, IncomeShareCalculator, TestLookup, create_test_actor, create_test_cause,
    create_test_gross_benefit, declaration, ym,
};
use crate::{Avkorting, Command, CoreError, State, TransitionResult, apply};
use avkorting_domain::{CaseRef, CaseType, DomainError};
use time::Month;

fn register_first_decision() -> Command {
    Command::NewIncomeDeclaration {
        declaration: declaration(ym(2024, Month::March), 120_000),
        case_type: CaseType::FirstDecision,
        effective_month: ym(2024, Month::March),
        gross_benefit: Some(create_test_gross_benefit()),
        stop_from: None,
    }
}

#[test]
fn test_valid_command_returns_new_state() {
    let state: State = State::new(CaseRef::generate());

    let result: Result<TransitionResult, CoreError> = apply(
        &state,
        register_first_decision(),
        create_test_actor(),
        create_test_cause(),
        &IncomeShareCalculator,
        &TestLookup::default(),
    );

    let transition: TransitionResult = result.unwrap();
    assert_eq!(transition.new_state.case_ref, state.case_ref);
    assert_eq!(transition.new_state.avkorting.year_settlements().len(), 1);
    assert!(state.avkorting.year_settlements().is_empty());
}

#[test]
fn test_valid_command_emits_audit_event() {
    let state: State = State::new(CaseRef::generate());

    let transition: TransitionResult = apply(
        &state,
        register_first_decision(),
        create_test_actor(),
        create_test_cause(),
        &IncomeShareCalculator,
        &TestLookup::default(),
    )
    .unwrap();

    assert_eq!(transition.audit_event.case_ref, state.case_ref);
    assert_eq!(transition.audit_event.action.name, "NewIncomeDeclaration");
    assert_eq!(transition.audit_event.actor.id, "Z123456");
    assert_eq!(transition.audit_event.cause.id, "behandling-1");
    assert_ne!(transition.audit_event.before, transition.audit_event.after);
    assert!(
        transition
            .audit_event
            .after
            .data
            .contains("2024:declarations=1,periods=2")
    );
}

#[test]
fn test_invalid_command_returns_error() {
    let state: State = State::new(CaseRef::generate());
    let command: Command = Command::NewIncomeDeclaration {
        declaration: declaration(ym(2024, Month::March), 120_000),
        case_type: CaseType::Reassessment,
        effective_month: ym(2024, Month::March),
        gross_benefit: None,
        stop_from: None,
    };

    let result: Result<TransitionResult, CoreError> = apply(
        &state,
        command,
        create_test_actor(),
        create_test_cause(),
        &IncomeShareCalculator,
        &TestLookup::default(),
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::FirstReassessmentNotJanuary { .. }
        ))
    ));
}

#[test]
fn test_calculator_failure_leaves_state_untouched() {
    let state: State = State::new(CaseRef::generate());

    let result: Result<TransitionResult, CoreError> = apply(
        &state,
        register_first_decision(),
        create_test_actor(),
        create_test_cause(),
        &FailingCalculator,
        &TestLookup::default(),
    );

    assert!(matches!(result, Err(CoreError::Collaborator(_))));
    assert_eq!(state.avkorting, Avkorting::new());
}

#[test]
fn test_copy_for_new_case_command() {
    let state: State = State::new(CaseRef::generate());
    let registered: TransitionResult = apply(
        &state,
        register_first_decision(),
        create_test_actor(),
        create_test_cause(),
        &IncomeShareCalculator,
        &TestLookup::default(),
    )
    .unwrap();
    let next_case: State = State::with_avkorting(
        CaseRef::generate(),
        registered.new_state.avkorting.clone(),
    );

    let copied: TransitionResult = apply(
        &next_case,
        Command::CopyForNewCase {
            effective_month: ym(2024, Month::September),
        },
        create_test_actor(),
        create_test_cause(),
        &IncomeShareCalculator,
        &TestLookup::default(),
    )
    .unwrap();

    assert_eq!(copied.audit_event.action.name, "CopyForNewCase");
    assert_eq!(copied.new_state.case_ref, next_case.case_ref);
    assert!(
        copied.new_state.avkorting.year_settlements()[0]
            .final_reconciled_periods
            .is_empty()
    );
}

#[test]
fn test_recompute_command_without_declaration_fails() {
    let state: State = State::new(CaseRef::generate());

    let result: Result<TransitionResult, CoreError> = apply(
        &state,
        Command::RecomputeGrossBenefit {
            gross_benefit: create_test_gross_benefit(),
            effective_month: ym(2024, Month::March),
            stop_from: None,
        },
        create_test_actor(),
        create_test_cause(),
        &IncomeShareCalculator,
        &TestLookup::default(),
    );

    assert!(matches!(
        result,
        Err(CoreError::MissingIncomeDeclaration { year: 2024 })
    ));
}

#[test]
fn test_repair_command_with_nothing_missing_records_no_change() {
    let state: State = State::new(CaseRef::generate());

    let transition: TransitionResult = apply(
        &state,
        Command::RepairMissingYears {
            decision_history: Vec::new(),
            granted_periods: Vec::new(),
        },
        create_test_actor(),
        create_test_cause(),
        &IncomeShareCalculator,
        &TestLookup::default(),
    )
    .unwrap();

    assert_eq!(transition.audit_event.action.name, "RepairMissingYears");
    assert_eq!(transition.audit_event.before, transition.audit_event.after);
}

#[test]
fn test_command_deserializes_from_tagged_json() {
    let json: &str = r#"{"type":"CopyForNewCase","effective_month":"2024-09"}"#;

    let command: Command = serde_json::from_str(json).unwrap();

    assert_eq!(
        command,
        Command::CopyForNewCase {
            effective_month: ym(2024, Month::September)
        }
    );
}
