// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ledger and audit event writes.

use avkorting::Avkorting;
use avkorting_audit::AuditEvent;
use avkorting_domain::CaseRef;
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::backend::get_last_insert_rowid;
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::{audit_events, ledgers};
use crate::error::PersistenceError;

fn now_rfc3339() -> Result<String, PersistenceError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Stores `avkorting` as the ledger of `case_ref`, replacing any earlier one.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_ledger(
    conn: &mut SqliteConnection,
    case_ref: CaseRef,
    avkorting: &Avkorting,
) -> Result<(), PersistenceError> {
    let document: String = serde_json::to_string(avkorting)?;
    let year_count: i32 = i32::try_from(avkorting.year_settlements().len())
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
    let updated_at: String = now_rfc3339()?;

    diesel::insert_into(ledgers::table)
        .values((
            ledgers::case_ref.eq(case_ref.to_string()),
            ledgers::document.eq(&document),
            ledgers::year_count.eq(year_count),
            ledgers::updated_at.eq(&updated_at),
        ))
        .on_conflict(ledgers::case_ref)
        .do_update()
        .set((
            ledgers::document.eq(&document),
            ledgers::year_count.eq(year_count),
            ledgers::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;

    debug!(case_ref = %case_ref, year_count, "Saved ledger");
    Ok(())
}

/// Persists an audit event for a case whose ledger is already stored.
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let actor_data: ActorData = ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    };
    let cause_data: CauseData = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };
    let action_data: ActionData = ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    };
    let before_data: StateSnapshotData = StateSnapshotData {
        data: event.before.data.clone(),
    };
    let after_data: StateSnapshotData = StateSnapshotData {
        data: event.after.data.clone(),
    };

    diesel::insert_into(audit_events::table)
        .values((
            audit_events::case_ref.eq(event.case_ref.to_string()),
            audit_events::actor_json.eq(serde_json::to_string(&actor_data)?),
            audit_events::cause_json.eq(serde_json::to_string(&cause_data)?),
            audit_events::action_json.eq(serde_json::to_string(&action_data)?),
            audit_events::before_snapshot_json.eq(serde_json::to_string(&before_data)?),
            audit_events::after_snapshot_json.eq(serde_json::to_string(&after_data)?),
            audit_events::created_at.eq(now_rfc3339()?),
        ))
        .execute(conn)?;

    let event_id: i64 = get_last_insert_rowid(conn)?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}
