// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The income-offset ledger of one case.
//!
//! `Avkorting` is an immutable value: every operation returns a new ledger
//! and leaves `self` untouched, so a failed operation has no effect.

use crate::error::CoreError;
use avkorting_audit::Actor;
use avkorting_domain::{
    BuildOptions, CaseType, DeclarationId, DomainError, GrossBenefitPeriod, IncomeDeclaration,
    IncomeEntry, OffsetCalculator, ReconciledPeriod, ReconciliationKind, YearMonth,
    YearSettlement, build_year, upsert_declaration, validate_declaration,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;
use tracing::debug;

/// The multi-year income-offset ledger of a case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avkorting {
    /// Year settlements, ascending by year, at most one per year.
    year_settlements: Vec<YearSettlement>,
}

impl Avkorting {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            year_settlements: Vec::new(),
        }
    }

    /// Builds a ledger from settlements, sorting them by year.
    ///
    /// A later settlement for an already present year replaces the earlier one.
    /// Every year but the latest is closed at December.
    #[must_use]
    pub fn from_settlements(settlements: Vec<YearSettlement>) -> Self {
        let mut by_year: Vec<YearSettlement> = Vec::with_capacity(settlements.len());
        for settlement in settlements {
            by_year.retain(|existing| existing.year != settlement.year);
            by_year.push(settlement);
        }
        by_year.sort_by_key(|settlement| settlement.year);
        if let Some((_, earlier)) = by_year.split_last_mut() {
            for settlement in earlier {
                settlement.close_at_year_end();
            }
        }
        Self {
            year_settlements: by_year,
        }
    }

    /// All year settlements, ascending by year.
    #[must_use]
    pub fn year_settlements(&self) -> &[YearSettlement] {
        &self.year_settlements
    }

    /// The settlement for `year`, if any.
    #[must_use]
    pub fn year_settlement(&self, year: i32) -> Option<&YearSettlement> {
        self.year_settlements
            .iter()
            .find(|settlement| settlement.year == year)
    }

    /// The latest income declaration in the ledger.
    #[must_use]
    pub fn latest_declaration(&self) -> Option<&IncomeDeclaration> {
        self.year_settlements
            .iter()
            .rev()
            .find_map(YearSettlement::latest_entry)
            .map(|entry| &entry.declaration)
    }

    /// Registers an income declaration and recomputes its year.
    ///
    /// The declaration is validated first, then stamped with `actor` and
    /// inserted into the ledger of `effective_month`'s year (created if the
    /// year has no settlement yet). With a gross benefit the whole year is
    /// settled; without one only the offsets and previews are computed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The declaration fails validation
    /// - The declaration does not start in `effective_month`'s year
    /// - The offset calculator fails
    #[allow(clippy::too_many_arguments)]
    pub fn with_new_income_declaration<C: OffsetCalculator>(
        &self,
        mut declaration: IncomeDeclaration,
        case_type: CaseType,
        effective_month: YearMonth,
        actor: &Actor,
        gross_benefit: Option<&[GrossBenefitPeriod]>,
        stop_from: Option<YearMonth>,
        calculator: &C,
    ) -> Result<Self, CoreError> {
        let year: i32 = effective_month.year();
        if declaration.effective_from().year() != year {
            return Err(DomainError::DeclarationOutsideYear {
                from: declaration.effective_from(),
                year,
            }
            .into());
        }

        let existing: Option<&YearSettlement> = self.year_settlement(year);
        validate_declaration(
            &declaration,
            case_type,
            existing,
            self.latest_declaration(),
        )?;

        declaration.source.clone_from(&actor.id);
        declaration.created_at = OffsetDateTime::now_utc();

        let base: YearSettlement = existing
            .cloned()
            .unwrap_or_else(|| YearSettlement::new(declaration.effective_from()));
        let entries: Vec<IncomeEntry> = upsert_declaration(&base.income_entries, declaration);

        let kind: ReconciliationKind = if gross_benefit.is_some() {
            ReconciliationKind::YearSettlement
        } else {
            ReconciliationKind::ExpectedIncomePreview
        };
        let options: BuildOptions = BuildOptions {
            kind,
            effective_month,
            stop_from,
            open_ended: self.is_latest_year(year),
        };

        let settlement: YearSettlement = build_year(
            &base,
            gross_benefit.unwrap_or_default(),
            &entries,
            options,
            calculator,
        )
        .map_err(CoreError::collaborator)?;

        Ok(self.with_settlement(settlement))
    }

    /// Recomputes every year from `effective_month`'s year onward with a new
    /// gross benefit and unchanged income declarations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A targeted year has no income declaration
    /// - The offset calculator fails
    pub fn with_recomputed_gross_benefit<C: OffsetCalculator>(
        &self,
        gross_benefit: &[GrossBenefitPeriod],
        effective_month: YearMonth,
        stop_from: Option<YearMonth>,
        calculator: &C,
    ) -> Result<Self, CoreError> {
        let first_year: i32 = effective_month.year();
        let last_year: i32 = self
            .year_settlements
            .last()
            .map_or(first_year, |settlement| settlement.year.max(first_year));

        let mut updated: Self = self.clone();
        for year in first_year..=last_year {
            let base: &YearSettlement = self
                .year_settlement(year)
                .filter(|settlement| !settlement.income_entries.is_empty())
                .ok_or(CoreError::MissingIncomeDeclaration { year })?;

            let options: BuildOptions = BuildOptions {
                kind: ReconciliationKind::YearSettlement,
                effective_month,
                stop_from,
                open_ended: self.is_latest_year(year),
            };
            let settlement: YearSettlement = build_year(
                base,
                gross_benefit,
                &base.income_entries,
                options,
                calculator,
            )
            .map_err(CoreError::collaborator)?;
            updated = updated.with_settlement(settlement);
        }
        Ok(updated)
    }

    /// Copies the ledger into a new re-assessment case.
    ///
    /// Every declaration gets a fresh identity and gross periods are cut to
    /// start at `effective_month`. Computed offsets, previews and final
    /// timelines of years reaching `effective_month` are cleared; their final
    /// timeline becomes the settled baseline for arrears.
    #[must_use]
    pub fn copy_for_new_case(&self, effective_month: YearMonth) -> Self {
        let mut renamed: HashMap<DeclarationId, DeclarationId> = HashMap::new();
        let year_settlements: Vec<YearSettlement> = self
            .year_settlements
            .iter()
            .map(|settlement| settlement.carried_into_new_case(effective_month, &mut renamed))
            .collect();

        debug!(
            effective_month = %effective_month,
            years = year_settlements.len(),
            declarations = renamed.len(),
            "Copied ledger into new case"
        );
        Self { year_settlements }
    }

    /// The reconciled timeline from `effective_month` onward.
    ///
    /// Periods ending before `effective_month` are dropped and the first
    /// overlapping period is cut to start at it.
    #[must_use]
    pub fn reconciled_from(&self, effective_month: YearMonth) -> Vec<ReconciledPeriod> {
        self.year_settlements
            .iter()
            .flat_map(|settlement| settlement.final_reconciled_periods.iter())
            .filter_map(|reconciled| {
                reconciled
                    .period
                    .truncate_from(effective_month)
                    .map(|period| ReconciledPeriod {
                        period,
                        ..reconciled.clone()
                    })
            })
            .collect()
    }

    fn is_latest_year(&self, year: i32) -> bool {
        self.year_settlements
            .iter()
            .all(|settlement| settlement.year <= year)
    }

    /// Replaces or inserts `settlement`, closing earlier years at December.
    fn with_settlement(&self, settlement: YearSettlement) -> Self {
        let year: i32 = settlement.year;
        let mut year_settlements: Vec<YearSettlement> = self
            .year_settlements
            .iter()
            .filter(|existing| existing.year != year)
            .cloned()
            .collect();
        for earlier in year_settlements.iter_mut().filter(|s| s.year < year) {
            earlier.close_at_year_end();
        }
        year_settlements.push(settlement);
        year_settlements.sort_by_key(|settlement| settlement.year);
        Self { year_settlements }
    }
}
