// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ledger and audit event reads.

use avkorting::Avkorting;
use avkorting_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use avkorting_domain::CaseRef;
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData, StoredAuditEvent};
use crate::diesel_schema::{audit_events, ledgers};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    created_at: String,
}

/// Loads the ledger stored for `case_ref`, if any.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document cannot be
/// deserialized.
pub fn load_ledger(
    conn: &mut SqliteConnection,
    case_ref: CaseRef,
) -> Result<Option<Avkorting>, PersistenceError> {
    let document: Option<String> = ledgers::table
        .filter(ledgers::case_ref.eq(case_ref.to_string()))
        .select(ledgers::document)
        .first::<String>(conn)
        .optional()?;

    document
        .map(|document| serde_json::from_str::<Avkorting>(&document))
        .transpose()
        .map_err(PersistenceError::from)
}

/// Retrieves the audit timeline of `case_ref`, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn audit_events_for_case(
    conn: &mut SqliteConnection,
    case_ref: CaseRef,
) -> Result<Vec<StoredAuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::case_ref.eq(case_ref.to_string()))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?;

    rows.into_iter()
        .map(|row| {
            let actor_data: ActorData = serde_json::from_str(&row.actor_json)?;
            let cause_data: CauseData = serde_json::from_str(&row.cause_json)?;
            let action_data: ActionData = serde_json::from_str(&row.action_json)?;
            let before_data: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
            let after_data: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

            Ok(StoredAuditEvent {
                event_id: row.event_id,
                recorded_at: row.created_at,
                event: AuditEvent::new(
                    case_ref,
                    Actor::new(actor_data.id, actor_data.actor_type),
                    Cause::new(cause_data.id, cause_data.description),
                    Action::new(action_data.name, action_data.details),
                    StateSnapshot::new(before_data.data),
                    StateSnapshot::new(after_data.data),
                ),
            })
        })
        .collect()
}
