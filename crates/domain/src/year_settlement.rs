// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Year settlement (aarsoppgjoer) construction.
//!
//! A year settlement merges the gross benefit with the offset derived from
//! each income declaration into one reconciled timeline for the year.
//! Months before the effective month were already paid under the previous
//! decision; those are reproduced from the settled baseline, and whatever
//! they were over- or underpaid is recovered evenly from the months that
//! remain in the year.

use crate::ledger::{IncomeEntry, active_entry};
use crate::offset::{OffsetCalculator, evaluate_segments};
use crate::period::{Period, YearMonth, months};
use crate::types::{
    Arrears, ArrearsId, DeclarationId, GrossBenefitPeriod, IncomeOffsetPeriod, ReconciledPeriod,
    ReconciliationKind,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// The reconciled ledger for one calendar year of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSettlement {
    /// Calendar year.
    pub year: i32,
    /// First month of the year covered.
    pub start_month: YearMonth,
    /// Gross monthly amounts, within the year.
    pub gross_benefit_periods: Vec<GrossBenefitPeriod>,
    /// Income declarations, sorted, contiguous and non-overlapping.
    pub income_entries: Vec<IncomeEntry>,
    /// The authoritative reconciled timeline.
    pub final_reconciled_periods: Vec<ReconciledPeriod>,
    /// Final timeline of the previous decision, the baseline for arrears.
    #[serde(default)]
    pub settled_periods: Vec<ReconciledPeriod>,
}

/// Parameters for [`build_year`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Preview only, or the full year settlement.
    pub kind: ReconciliationKind,
    /// First month not yet paid under the previous decision.
    pub effective_month: YearMonth,
    /// First month without entitlement (opphoer), if the benefit stops.
    pub stop_from: Option<YearMonth>,
    /// Whether the timeline may stay open past December.
    pub open_ended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Settled,
    Recomputed,
    Remaining,
}

#[derive(Debug, Clone)]
struct MonthRow {
    month: YearMonth,
    segment: Segment,
    value: ReconciledPeriod,
}

impl YearSettlement {
    /// Creates an empty settlement starting at `start_month`.
    #[must_use]
    pub const fn new(start_month: YearMonth) -> Self {
        Self {
            year: start_month.year(),
            start_month,
            gross_benefit_periods: Vec::new(),
            income_entries: Vec::new(),
            final_reconciled_periods: Vec::new(),
            settled_periods: Vec::new(),
        }
    }

    /// The latest income declaration of the year.
    #[must_use]
    pub fn latest_entry(&self) -> Option<&IncomeEntry> {
        self.income_entries.last()
    }

    /// December of the settlement's year.
    #[must_use]
    pub const fn year_end(&self) -> YearMonth {
        YearMonth::last_of_year(self.year)
    }

    /// Ends every open period of the settlement in December.
    pub fn close_at_year_end(&mut self) {
        let year_end: YearMonth = self.year_end();
        for gross in &mut self.gross_benefit_periods {
            gross.period = gross.period.close_at(year_end);
        }
        for entry in &mut self.income_entries {
            entry.declaration.period = entry.declaration.period.close_at(year_end);
            for offset in &mut entry.offset_periods {
                offset.period = offset.period.close_at(year_end);
            }
            for preview in &mut entry.preview_reconciled_periods {
                preview.period = preview.period.close_at(year_end);
            }
        }
        for reconciled in self
            .final_reconciled_periods
            .iter_mut()
            .chain(self.settled_periods.iter_mut())
        {
            reconciled.period = reconciled.period.close_at(year_end);
        }
    }

    /// Copies the settlement into a new case.
    ///
    /// Declarations get fresh identities; the mapping from old to new ids is
    /// recorded in `renamed`. Gross periods are truncated to start at
    /// `effective_month`. Years that reach the effective month have their
    /// final timeline moved to the settled baseline and every computed
    /// offset and preview cleared. Earlier years keep their final timeline.
    #[must_use]
    pub fn carried_into_new_case(
        &self,
        effective_month: YearMonth,
        renamed: &mut HashMap<DeclarationId, DeclarationId>,
    ) -> Self {
        let income_entries: Vec<IncomeEntry> = self
            .income_entries
            .iter()
            .map(|entry| {
                let fresh: DeclarationId = DeclarationId::generate();
                renamed.insert(entry.declaration.id, fresh);
                let mut carried: IncomeEntry = entry.clone();
                carried.declaration.id = fresh;
                carried
            })
            .collect();

        let gross_benefit_periods: Vec<GrossBenefitPeriod> = self
            .gross_benefit_periods
            .iter()
            .filter_map(|gross| {
                gross
                    .period
                    .truncate_from(effective_month)
                    .map(|period| GrossBenefitPeriod {
                        period,
                        ..gross.clone()
                    })
            })
            .collect();

        let rename = |periods: &[ReconciledPeriod]| -> Vec<ReconciledPeriod> {
            periods
                .iter()
                .map(|reconciled| ReconciledPeriod {
                    income_declaration_ref: reconciled
                        .income_declaration_ref
                        .and_then(|old| renamed.get(&old).copied()),
                    ..reconciled.clone()
                })
                .collect()
        };

        let closed_before_effective: bool = self.year_end() < effective_month;
        let mut carried: Self = Self {
            year: self.year,
            start_month: self.start_month,
            gross_benefit_periods,
            income_entries,
            final_reconciled_periods: Vec::new(),
            settled_periods: Vec::new(),
        };

        if closed_before_effective {
            carried.final_reconciled_periods = rename(&self.final_reconciled_periods);
            carried.settled_periods = rename(&self.settled_periods);
        } else {
            carried.settled_periods = if self.final_reconciled_periods.is_empty() {
                rename(&self.settled_periods)
            } else {
                rename(&self.final_reconciled_periods)
            };
            for entry in &mut carried.income_entries {
                entry.clear_computed();
            }
        }
        carried
    }

    fn last_month(&self, stop_from: Option<YearMonth>) -> YearMonth {
        match stop_from {
            Some(stop) if stop <= self.year_end() => stop.previous(),
            _ => self.year_end(),
        }
    }

    fn gross_amount_at(&self, month: YearMonth) -> i64 {
        self.gross_benefit_periods
            .iter()
            .find(|gross| gross.period.contains(month))
            .map(|gross| gross.amount)
            .or_else(|| settled_at(&self.settled_periods, month).map(|p| p.gross_amount))
            .unwrap_or(0)
    }
}

/// Rebuilds the settlement `base` from `income_entries` and the incoming
/// gross periods.
///
/// Incoming gross periods replace the base's gross periods from the first
/// incoming month onward; an empty slice keeps the base's. With
/// [`ReconciliationKind::ExpectedIncomePreview`] only the offsets and the
/// per-declaration previews are recomputed and the final timeline is kept.
///
/// # Errors
///
/// Returns the offset calculator's error unchanged; `base` is not touched.
pub fn build_year<C: OffsetCalculator>(
    base: &YearSettlement,
    gross_benefit_periods: &[GrossBenefitPeriod],
    income_entries: &[IncomeEntry],
    options: BuildOptions,
    calculator: &C,
) -> Result<YearSettlement, C::Error> {
    let last_month: YearMonth = base.last_month(options.stop_from);
    let stopped_in_year: bool = last_month < base.year_end();
    let timeline_open: bool = options.open_ended && !stopped_in_year;

    debug!(
        year = base.year,
        effective_month = %options.effective_month,
        kind = ?options.kind,
        entries = income_entries.len(),
        "Rebuilding year settlement"
    );

    let mut settlement: YearSettlement = base.clone();
    settlement.gross_benefit_periods = merge_gross(
        &base.gross_benefit_periods,
        gross_benefit_periods,
        base.year,
        timeline_open,
    );

    let mut entries: Vec<IncomeEntry> = income_entries.to_vec();
    let count: usize = entries.len();
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.clear_computed();
        let Some(validity) = entry.period().clamp(base.start_month, Some(last_month)) else {
            continue;
        };
        let evaluated: Period = if index + 1 == count && timeline_open {
            Period::open(validity.from())
        } else {
            validity
        };

        entry.offset_periods = evaluate_segments(calculator, &entry.declaration, evaluated)?;

        let rows: Vec<MonthRow> = months(validity.from(), validity_end(validity))
            .map(|month| MonthRow {
                month,
                segment: Segment::Remaining,
                value: fresh_month(
                    &settlement,
                    month,
                    offset_at(&entry.offset_periods, month),
                    Some(entry.declaration.id),
                    ReconciliationKind::ExpectedIncomePreview,
                ),
            })
            .collect();
        entry.preview_reconciled_periods = merge_rows(rows, evaluated.is_open());
    }
    settlement.income_entries = entries;

    if options.kind == ReconciliationKind::YearSettlement {
        settlement.final_reconciled_periods =
            final_timeline(&settlement, options.effective_month, last_month, timeline_open);
    }

    Ok(settlement)
}

fn final_timeline(
    settlement: &YearSettlement,
    effective_month: YearMonth,
    last_month: YearMonth,
    timeline_open: bool,
) -> Vec<ReconciledPeriod> {
    let mut rows: Vec<MonthRow> = Vec::new();
    let mut total_arrears: i64 = 0;

    for month in months(settlement.start_month, last_month) {
        let entry: Option<&IncomeEntry> = active_entry(&settlement.income_entries, month);
        let recomputed: ReconciledPeriod = fresh_month(
            settlement,
            month,
            entry.map_or(0, |entry| offset_at(&entry.offset_periods, month)),
            entry.map(|entry| entry.declaration.id),
            ReconciliationKind::YearSettlement,
        );

        if month < effective_month {
            if let Some(paid) = settled_at(&settlement.settled_periods, month) {
                total_arrears += paid.net_after_arrears - recomputed.net_before_arrears;
                rows.push(MonthRow {
                    month,
                    segment: Segment::Settled,
                    value: single_month(paid, month),
                });
            } else {
                rows.push(MonthRow {
                    month,
                    segment: Segment::Recomputed,
                    value: recomputed,
                });
            }
        } else {
            rows.push(MonthRow {
                month,
                segment: Segment::Remaining,
                value: recomputed,
            });
        }
    }

    if total_arrears != 0 {
        apply_arrears(settlement.year, &mut rows, total_arrears);
    }

    let ends_with_arrears: bool = rows
        .last()
        .is_some_and(|row| row.value.arrears.is_some());
    merge_rows(rows, timeline_open && !ends_with_arrears)
}

fn apply_arrears(year: i32, rows: &mut [MonthRow], total_amount: i64) {
    let remaining: i64 = rows
        .iter()
        .filter(|row| row.segment == Segment::Remaining)
        .count()
        .try_into()
        .unwrap_or(i64::MAX);

    if remaining == 0 {
        warn!(
            year,
            total_amount, "No remaining months in the year to recover arrears from"
        );
        return;
    }

    let arrears: Arrears = Arrears {
        id: ArrearsId::generate(),
        total_amount,
        apportioned_amount: divide_rounded(total_amount, remaining),
    };
    info!(
        year,
        total_amount,
        apportioned_amount = arrears.apportioned_amount,
        remaining_months = remaining,
        "Arrears apportioned over remaining months"
    );

    for row in rows
        .iter_mut()
        .filter(|row| row.segment == Segment::Remaining)
    {
        row.value.net_after_arrears =
            (row.value.net_before_arrears - arrears.apportioned_amount).max(0);
        row.value.arrears = Some(arrears.clone());
    }
}

/// Divides rounding half away from zero. `divisor` must be positive.
#[must_use]
pub fn divide_rounded(dividend: i64, divisor: i64) -> i64 {
    let quotient: i64 = dividend / divisor;
    let remainder: i64 = dividend % divisor;
    if remainder.abs() * 2 >= divisor {
        quotient + dividend.signum()
    } else {
        quotient
    }
}

fn fresh_month(
    settlement: &YearSettlement,
    month: YearMonth,
    offset_amount: i64,
    income_declaration_ref: Option<DeclarationId>,
    kind: ReconciliationKind,
) -> ReconciledPeriod {
    let gross_amount: i64 = settlement.gross_amount_at(month);
    let net: i64 = (gross_amount - offset_amount).max(0);
    ReconciledPeriod {
        period: Period::bounded(month, month),
        gross_amount,
        offset_amount,
        net_before_arrears: net,
        arrears: None,
        net_after_arrears: net,
        kind,
        income_declaration_ref,
    }
}

fn single_month(reconciled: &ReconciledPeriod, month: YearMonth) -> ReconciledPeriod {
    ReconciledPeriod {
        period: Period::bounded(month, month),
        ..reconciled.clone()
    }
}

fn settled_at(settled: &[ReconciledPeriod], month: YearMonth) -> Option<&ReconciledPeriod> {
    settled.iter().find(|period| period.period.contains(month))
}

fn offset_at(offsets: &[IncomeOffsetPeriod], month: YearMonth) -> i64 {
    offsets
        .iter()
        .find(|offset| offset.period.contains(month))
        .map_or(0, |offset| offset.amount)
}

fn validity_end(validity: Period) -> YearMonth {
    validity
        .to()
        .unwrap_or_else(|| YearMonth::last_of_year(validity.from().year()))
}

/// Joins consecutive months with identical values into periods.
fn merge_rows(rows: Vec<MonthRow>, open_last: bool) -> Vec<ReconciledPeriod> {
    let mut merged: Vec<(Segment, ReconciledPeriod)> = Vec::new();

    for row in rows {
        if let Some((segment, last)) = merged.last_mut()
            && *segment == row.segment
            && same_amounts(last, &row.value)
            && last.period.to().is_some_and(|to| to.next() == row.month)
        {
            last.period = Period::bounded(last.period.from(), row.month);
            continue;
        }
        merged.push((row.segment, row.value));
    }

    let mut periods: Vec<ReconciledPeriod> =
        merged.into_iter().map(|(_, period)| period).collect();
    if open_last && let Some(last) = periods.last_mut() {
        last.period = Period::open(last.period.from());
    }
    periods
}

fn same_amounts(a: &ReconciledPeriod, b: &ReconciledPeriod) -> bool {
    a.gross_amount == b.gross_amount
        && a.offset_amount == b.offset_amount
        && a.net_before_arrears == b.net_before_arrears
        && a.arrears == b.arrears
        && a.net_after_arrears == b.net_after_arrears
        && a.kind == b.kind
        && a.income_declaration_ref == b.income_declaration_ref
}

fn merge_gross(
    existing: &[GrossBenefitPeriod],
    incoming: &[GrossBenefitPeriod],
    year: i32,
    timeline_open: bool,
) -> Vec<GrossBenefitPeriod> {
    let first: YearMonth = YearMonth::first_of_year(year);
    let last: YearMonth = YearMonth::last_of_year(year);

    let mut merged: Vec<GrossBenefitPeriod> = match incoming.iter().map(|g| g.period.from()).min()
    {
        None => existing.to_vec(),
        Some(replaced_from) => existing
            .iter()
            .filter(|gross| gross.period.from() < replaced_from)
            .map(|gross| GrossBenefitPeriod {
                period: gross.period.close_at(replaced_from.previous()),
                ..gross.clone()
            })
            .chain(incoming.iter().cloned())
            .collect(),
    };

    merged.retain(|gross| gross.period.from() <= last);
    let bound: Option<YearMonth> = if timeline_open { None } else { Some(last) };
    let mut clamped: Vec<GrossBenefitPeriod> = merged
        .into_iter()
        .filter_map(|gross| {
            gross.period.clamp(first, bound).map(|period| GrossBenefitPeriod {
                period,
                ..gross
            })
        })
        .collect();
    clamped.sort_by_key(|gross| gross.period.from());

    // Only the final period may reach past December.
    let count: usize = clamped.len();
    for gross in clamped.iter_mut().take(count.saturating_sub(1)) {
        gross.period = gross.period.close_at(last);
    }
    clamped
}
