// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repair of year settlements lost when a case's decision history branches.

use crate::avkorting::Avkorting;
use crate::error::CoreError;
use avkorting_domain::{CaseRef, Decision, Period, YearMonth, YearSettlement};
use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, info};

/// Looks up the ledger stored for a case.
pub trait LedgerLookup {
    /// Error reported by the lookup.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the ledger stored for `case_ref`, if any.
    ///
    /// # Errors
    ///
    /// Returns the lookup's own error when the ledger cannot be read.
    fn ledger_for_case(&self, case_ref: CaseRef) -> Result<Option<Avkorting>, Self::Error>;
}

/// Copies year settlements missing from `latest` out of earlier decisions'
/// ledgers.
///
/// The years expected run from the earliest granted period's year to the
/// year of the most recently attested decision. For each missing year the
/// decisions are searched from the most recently attested backwards, and the
/// first ledger holding that year provides a verbatim copy. Years starting
/// at or after the benefit stop are never repaired.
///
/// Returns `Cow::Borrowed(latest)` when no year is missing.
///
/// # Errors
///
/// Returns an error if:
/// - The ledger lookup fails
/// - No ledger in the history holds a missing year
pub fn repair_missing_years<'a, L: LedgerLookup>(
    latest: &'a Avkorting,
    decision_history: &[Decision],
    granted_periods: &[Period],
    lookup: &L,
) -> Result<Cow<'a, Avkorting>, CoreError> {
    let Some(first_year) = granted_periods.iter().map(|p| p.from().year()).min() else {
        return Ok(Cow::Borrowed(latest));
    };
    let Some(most_recent) = decision_history.iter().max_by_key(|d| d.attested_at) else {
        return Ok(Cow::Borrowed(latest));
    };
    let stop_from: Option<YearMonth> = benefit_stop(granted_periods);

    let missing: Vec<i32> = (first_year..=most_recent.effective_month.year())
        .filter(|year| latest.year_settlement(*year).is_none())
        .filter(|year| stop_from.is_none_or(|stop| YearMonth::first_of_year(*year) < stop))
        .collect();

    if missing.is_empty() {
        return Ok(Cow::Borrowed(latest));
    }
    debug!(?missing, "Year settlements missing from ledger");

    let mut newest_first: Vec<&Decision> = decision_history.iter().collect();
    newest_first.sort_by(|a, b| b.attested_at.cmp(&a.attested_at));

    let mut examined: HashMap<CaseRef, Option<Avkorting>> = HashMap::new();
    let mut repaired: Vec<YearSettlement> = latest.year_settlements().to_vec();

    for year in missing {
        let mut found: Option<YearSettlement> = None;
        for decision in &newest_first {
            let ledger: &Option<Avkorting> = match examined.entry(decision.case_ref) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(
                    lookup
                        .ledger_for_case(decision.case_ref)
                        .map_err(CoreError::collaborator)?,
                ),
            };
            if let Some(settlement) = ledger.as_ref().and_then(|l| l.year_settlement(year)) {
                info!(
                    year,
                    case_ref = %decision.case_ref,
                    "Repairing year settlement from earlier decision"
                );
                found = Some(settlement.clone());
                break;
            }
        }
        repaired.push(found.ok_or(CoreError::MissingYearSettlement { year })?);
    }

    Ok(Cow::Owned(Avkorting::from_settlements(repaired)))
}

/// First month without entitlement, when the latest granted period ends.
fn benefit_stop(granted_periods: &[Period]) -> Option<YearMonth> {
    granted_periods
        .iter()
        .max_by_key(|period| period.from())
        .and_then(Period::to)
        .map(|last| last.next())
}
