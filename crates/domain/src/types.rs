// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::period::{Period, YearMonth};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing identifier.
            #[must_use]
            pub const fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Identity of an income declaration. Stable across in-place replacement,
    /// regenerated when a ledger is copied into a new case.
    DeclarationId
);
uuid_id!(
    /// Identity of an arrears record.
    ArrearsId
);
uuid_id!(
    /// Reference to a case (behandling).
    CaseRef
);

/// The kind of case an income declaration is registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseType {
    /// The first decision granting the benefit.
    FirstDecision,
    /// A follow-up case amending an earlier decision (revurdering).
    Reassessment,
}

/// The kind of an attested decision in a case's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionType {
    /// The first decision granting the benefit.
    FirstDecision,
    /// A decision amending an earlier one.
    Reassessment,
    /// A decision stopping the benefit by hand.
    ManualStop,
}

/// A statement of expected annual income valid from a given month (grunnlag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeDeclaration {
    /// Identity, stable across in-place replacement.
    pub id: DeclarationId,
    /// Validity. Within a year settlement the effective end is governed by
    /// the next entry, so this is usually open.
    pub period: Period,
    /// Expected income for the whole year.
    pub annual_income: i64,
    /// Income earned in the year before the entitlement started.
    pub year_deduction: i64,
    /// Expected foreign income for the whole year.
    pub foreign_income: i64,
    /// Foreign income earned before the entitlement started.
    pub foreign_year_deduction: i64,
    /// Months of entitlement assumed.
    pub entitled_months: u8,
    /// Months remaining in the year from the first declaration of the year.
    pub relevant_months_in_year: u8,
    /// Why `entitled_months` deviates from the default, when it does.
    pub overridden_entitled_months_reason: Option<String>,
    /// Free-text note from the caseworker.
    pub note: String,
    /// Who registered the declaration.
    pub source: String,
    /// When the declaration was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl IncomeDeclaration {
    /// Default number of entitled months.
    pub const DEFAULT_ENTITLED_MONTHS: u8 = 12;

    /// Creates a declaration effective from `from` with default entitlement
    /// and no deductions.
    #[must_use]
    pub fn new(from: YearMonth, annual_income: i64, source: &str) -> Self {
        Self {
            id: DeclarationId::generate(),
            period: Period::open(from),
            annual_income,
            year_deduction: 0,
            foreign_income: 0,
            foreign_year_deduction: 0,
            entitled_months: Self::DEFAULT_ENTITLED_MONTHS,
            relevant_months_in_year: from.remaining_in_year(),
            overridden_entitled_months_reason: None,
            note: String::new(),
            source: source.to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// The month the declaration takes effect.
    #[must_use]
    pub const fn effective_from(&self) -> YearMonth {
        self.period.from()
    }

    /// Whether either year-deduction field is non-zero.
    #[must_use]
    pub const fn has_year_deduction(&self) -> bool {
        self.year_deduction != 0 || self.foreign_year_deduction != 0
    }

    /// Whether the declaration covers a full entitlement year from January.
    #[must_use]
    pub fn covers_full_year(&self) -> bool {
        self.period.from().month() == time::Month::January
            && self.entitled_months == Self::DEFAULT_ENTITLED_MONTHS
    }
}

/// One result of the external offset evaluator for a segment of a
/// declaration's validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeOffsetPeriod {
    /// The segment evaluated.
    pub period: Period,
    /// Monthly offset amount.
    pub amount: i64,
    /// Opaque trace of the rule evaluation.
    pub rule_trace: String,
}

/// Monthly benefit amount before income offset (ytelse foer avkorting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossBenefitPeriod {
    /// Months the amount applies to.
    pub period: Period,
    /// Monthly gross amount.
    pub amount: i64,
    /// Reference to the benefit calculation that produced the amount.
    pub benefit_calculation_ref: String,
}

/// Over- or under-payment found for already-settled months (restanse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrears {
    /// Identity of the record.
    pub id: ArrearsId,
    /// Cumulative difference; positive means overpaid.
    pub total_amount: i64,
    /// Amount recovered from each remaining month of the year.
    pub apportioned_amount: i64,
}

/// Which computation produced a reconciled period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconciliationKind {
    /// Scoped to a single income declaration, for feedback before a
    /// settlement exists.
    ExpectedIncomePreview,
    /// The authoritative timeline for the whole year.
    YearSettlement,
}

/// A reconciled run of months (avkortet ytelse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledPeriod {
    /// Months covered.
    pub period: Period,
    /// Gross monthly amount.
    pub gross_amount: i64,
    /// Monthly offset amount.
    pub offset_amount: i64,
    /// `max(0, gross - offset)`.
    pub net_before_arrears: i64,
    /// Arrears recovered in these months, if any.
    pub arrears: Option<Arrears>,
    /// Net amount after arrears are recovered.
    pub net_after_arrears: i64,
    /// Which computation produced the period.
    pub kind: ReconciliationKind,
    /// Income declaration in force for these months.
    pub income_declaration_ref: Option<DeclarationId>,
}

/// An attested decision in a case's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The case the decision belongs to.
    pub case_ref: CaseRef,
    /// First month the decision takes effect.
    pub effective_month: YearMonth,
    /// When the decision was attested.
    #[serde(with = "time::serde::rfc3339")]
    pub attested_at: OffsetDateTime,
    /// Kind of decision.
    pub decision_type: DecisionType,
}
