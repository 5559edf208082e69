// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use avkorting_domain::{
    CaseType, Decision, GrossBenefitPeriod, IncomeDeclaration, Period, YearMonth,
};
use serde::{Deserialize, Serialize};

/// A command represents caseworker or system intent as data only.
///
/// Commands are the only way to request ledger changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Register a new or corrected income declaration.
    NewIncomeDeclaration {
        /// The declaration.
        declaration: IncomeDeclaration,
        /// The kind of case registering it.
        case_type: CaseType,
        /// The case's virkningstidspunkt.
        effective_month: YearMonth,
        /// Gross benefit, absent while only a preview is wanted.
        gross_benefit: Option<Vec<GrossBenefitPeriod>>,
        /// First month without entitlement, if the benefit stops.
        #[serde(default)]
        stop_from: Option<YearMonth>,
    },
    /// Recompute with a corrected gross benefit.
    RecomputeGrossBenefit {
        /// The new gross benefit.
        gross_benefit: Vec<GrossBenefitPeriod>,
        /// The case's virkningstidspunkt.
        effective_month: YearMonth,
        /// First month without entitlement, if the benefit stops.
        #[serde(default)]
        stop_from: Option<YearMonth>,
    },
    /// Carry the ledger into a new re-assessment case.
    CopyForNewCase {
        /// The new case's virkningstidspunkt.
        effective_month: YearMonth,
    },
    /// Restore year settlements lost in the decision lineage.
    RepairMissingYears {
        /// Attested decisions of the sak.
        decision_history: Vec<Decision>,
        /// Periods the benefit was granted for.
        granted_periods: Vec<Period>,
    },
}

impl Command {
    /// The command's name as recorded in audit events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewIncomeDeclaration { .. } => "NewIncomeDeclaration",
            Self::RecomputeGrossBenefit { .. } => "RecomputeGrossBenefit",
            Self::CopyForNewCase { .. } => "CopyForNewCase",
            Self::RepairMissingYears { .. } => "RepairMissingYears",
        }
    }
}
