// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use avkorting::{Avkorting, Command, State, TransitionResult, apply};
use avkorting_audit::{Actor, Cause};
use avkorting_domain::{CaseRef, OffsetCalculator};
use avkorting_persistence::{AvkortingRepository, Persistence};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// A replay script: cases processed in order.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub cases: Vec<ScriptCase>,
}

/// The events of one case (behandling).
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptCase {
    pub case_ref: CaseRef,
    /// Case whose stored ledger this case starts from.
    #[serde(default)]
    pub copy_from: Option<CaseRef>,
    pub actor_id: String,
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    pub cause: String,
    pub command: Command,
}

/// The outcome of replaying one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub case_ref: CaseRef,
    pub events_applied: usize,
    pub last_event_id: Option<i64>,
    pub ledger: Avkorting,
}

/// Applies every event of every case, persisting each transition.
///
/// # Errors
///
/// Returns the first error raised by a command, the calculator or the
/// database. Transitions persisted before the failure are kept.
pub fn replay<C: OffsetCalculator>(
    script: Script,
    calculator: &C,
    persistence: &Persistence,
) -> Result<Vec<CaseReport>, Box<dyn std::error::Error>> {
    let mut reports: Vec<CaseReport> = Vec::with_capacity(script.cases.len());

    for case in script.cases {
        let starting_ledger: Avkorting = match case.copy_from {
            Some(source) => persistence.require(source)?,
            None => persistence.load(case.case_ref)?.unwrap_or_default(),
        };
        let mut state: State = State::with_avkorting(case.case_ref, starting_ledger);
        let mut last_event_id: Option<i64> = None;
        let events_applied: usize = case.events.len();

        info!(case_ref = %case.case_ref, events = events_applied, "Replaying case");

        for (index, event) in case.events.into_iter().enumerate() {
            let actor: Actor = Actor::new(case.actor_id.clone(), String::from("caseworker"));
            let cause: Cause = Cause::new(format!("{}#{index}", case.case_ref), event.cause);

            let result: TransitionResult =
                apply(&state, event.command, actor, cause, calculator, persistence).inspect_err(
                    |err| error!(case_ref = %case.case_ref, index, error = %err, "Event rejected"),
                )?;
            last_event_id = Some(persistence.persist_transition(&result)?);
            state = result.new_state;
        }

        reports.push(CaseReport {
            case_ref: state.case_ref,
            events_applied,
            last_event_id,
            ledger: state.avkorting,
        });
    }

    Ok(reports)
}
