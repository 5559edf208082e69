// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::avkorting::Avkorting;
use crate::command::Command;
use crate::error::CoreError;
use crate::lineage::{LedgerLookup, repair_missing_years};
use crate::state::{State, TransitionResult};
use avkorting_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use avkorting_domain::{OffsetCalculator, YearMonth};
use std::borrow::Cow;
use tracing::info;

/// Applies a command to the current state, producing a new state and audit event.
///
/// This function is pure and deterministic apart from the timestamp stamped
/// on registered declarations. The input state is never mutated.
///
/// # Arguments
///
/// * `state` - The current state (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `calculator` - The offset calculator used for recomputation
/// * `lookup` - Ledger lookup for lineage repair
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state and audit event
/// * `Err(CoreError)` if the command is invalid or a collaborator fails
///
/// # Errors
///
/// Returns an error if:
/// - An income declaration violates a validation rule
/// - A recomputed year has no income declaration
/// - A missing year cannot be found in the decision history
/// - The offset calculator or ledger lookup fails
pub fn apply<C: OffsetCalculator, L: LedgerLookup>(
    state: &State,
    command: Command,
    actor: Actor,
    cause: Cause,
    calculator: &C,
    lookup: &L,
) -> Result<TransitionResult, CoreError> {
    let name: &'static str = command.name();

    let (avkorting, details): (Avkorting, String) = match command {
        Command::NewIncomeDeclaration {
            declaration,
            case_type,
            effective_month,
            gross_benefit,
            stop_from,
        } => {
            let from: YearMonth = declaration.effective_from();
            let income: i64 = declaration.annual_income;
            let avkorting: Avkorting = state.avkorting.with_new_income_declaration(
                declaration,
                case_type,
                effective_month,
                &actor,
                gross_benefit.as_deref(),
                stop_from,
                calculator,
            )?;
            (
                avkorting,
                format!("Registered income {income} from {from} effective {effective_month}"),
            )
        }
        Command::RecomputeGrossBenefit {
            gross_benefit,
            effective_month,
            stop_from,
        } => {
            let avkorting: Avkorting = state.avkorting.with_recomputed_gross_benefit(
                &gross_benefit,
                effective_month,
                stop_from,
                calculator,
            )?;
            (
                avkorting,
                format!(
                    "Recomputed {} gross benefit periods effective {effective_month}",
                    gross_benefit.len()
                ),
            )
        }
        Command::CopyForNewCase { effective_month } => (
            state.avkorting.copy_for_new_case(effective_month),
            format!("Copied ledger effective {effective_month}"),
        ),
        Command::RepairMissingYears {
            decision_history,
            granted_periods,
        } => {
            let repaired: Cow<'_, Avkorting> = repair_missing_years(
                &state.avkorting,
                &decision_history,
                &granted_periods,
                lookup,
            )?;
            let added: usize = repaired
                .year_settlements()
                .len()
                .saturating_sub(state.avkorting.year_settlements().len());
            (
                repaired.into_owned(),
                format!("Repaired {added} missing year settlements"),
            )
        }
    };

    let new_state: State = State::with_avkorting(state.case_ref, avkorting);

    let before: StateSnapshot = state.to_snapshot();
    let after: StateSnapshot = new_state.to_snapshot();
    let action: Action = Action::new(String::from(name), Some(details));
    let audit_event: AuditEvent =
        AuditEvent::new(state.case_ref, actor, cause, action, before, after);

    info!(case_ref = %state.case_ref, action = name, "Applied command");

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}
