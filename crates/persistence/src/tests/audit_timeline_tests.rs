// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use avkorting::{State, TransitionResult};
use avkorting_audit::AuditEvent;
use avkorting_domain::CaseRef;
use time::Month;

use super::{apply_to, create_stored_ledger, register_income};
use crate::{Persistence, PersistenceError, StoredAuditEvent};

#[test]
fn test_persisted_transition_records_audit_event() {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (case_ref, _) = create_stored_ledger(&persistence);

    let timeline: Vec<StoredAuditEvent> = persistence.audit_timeline(case_ref).unwrap();

    assert_eq!(timeline.len(), 1);
    let event: &AuditEvent = &timeline[0].event;
    assert_eq!(event.case_ref, case_ref);
    assert_eq!(event.action.name, "NewIncomeDeclaration");
    assert_eq!(event.actor.id, "test-actor");
    assert_eq!(event.cause.description, "Test operation");
    assert!(!timeline[0].recorded_at.is_empty());
}

#[test]
fn test_audit_timeline_is_ordered_and_scoped_to_case() {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (case_ref, avkorting) = create_stored_ledger(&persistence);
    let (other_case, _) = create_stored_ledger(&persistence);

    let state: State = State::with_avkorting(case_ref, avkorting);
    let second: TransitionResult = apply_to(&persistence, &state, register_income(Month::July));
    persistence.persist_transition(&second).unwrap();

    let timeline: Vec<StoredAuditEvent> = persistence.audit_timeline(case_ref).unwrap();
    assert_eq!(timeline.len(), 2);
    assert!(timeline[0].event_id < timeline[1].event_id);
    assert_eq!(timeline[1].event, second.audit_event);
    assert_eq!(persistence.audit_timeline(other_case).unwrap().len(), 1);
}

#[test]
fn test_unknown_case_has_empty_timeline() {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();

    let timeline: Result<Vec<StoredAuditEvent>, PersistenceError> =
        persistence.audit_timeline(CaseRef::generate());

    assert_eq!(timeline, Ok(Vec::new()));
}
