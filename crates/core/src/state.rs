// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::avkorting::Avkorting;
use avkorting_audit::{AuditEvent, StateSnapshot};
use avkorting_domain::{CaseRef, YearSettlement};

/// The ledger state scoped to a single case (behandling).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// The case this state is scoped to.
    pub case_ref: CaseRef,
    /// The case's income-offset ledger.
    pub avkorting: Avkorting,
}

impl State {
    /// Creates a new state with an empty ledger.
    ///
    /// # Arguments
    ///
    /// * `case_ref` - The case this state is scoped to
    #[must_use]
    pub const fn new(case_ref: CaseRef) -> Self {
        Self {
            case_ref,
            avkorting: Avkorting::new(),
        }
    }

    /// Creates a state around an existing ledger.
    #[must_use]
    pub const fn with_avkorting(case_ref: CaseRef, avkorting: Avkorting) -> Self {
        Self {
            case_ref,
            avkorting,
        }
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let years: Vec<String> = self
            .avkorting
            .year_settlements()
            .iter()
            .map(describe_year)
            .collect();
        StateSnapshot::new(format!(
            "case={},years=[{}]",
            self.case_ref,
            years.join(";")
        ))
    }
}

fn describe_year(settlement: &YearSettlement) -> String {
    format!(
        "{}:declarations={},periods={}",
        settlement.year,
        settlement.income_entries.len(),
        settlement.final_reconciled_periods.len()
    )
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: State,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
