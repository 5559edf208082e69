// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The per-year sequence of income declarations.
//!
//! Entries are kept sorted by start month. Each entry's declaration period
//! ends the month before the next entry starts; the last entry is open.

use crate::period::{Period, YearMonth};
use crate::types::{IncomeDeclaration, IncomeOffsetPeriod, ReconciledPeriod};
use serde::{Deserialize, Serialize};

/// An income declaration together with what was computed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEntry {
    /// The declaration.
    pub declaration: IncomeDeclaration,
    /// Offset amounts over the declaration's effective validity.
    pub offset_periods: Vec<IncomeOffsetPeriod>,
    /// Reconciliation of the gross amount against this declaration alone.
    pub preview_reconciled_periods: Vec<ReconciledPeriod>,
}

impl IncomeEntry {
    /// Wraps a declaration with nothing computed yet.
    #[must_use]
    pub const fn new(declaration: IncomeDeclaration) -> Self {
        Self {
            declaration,
            offset_periods: Vec::new(),
            preview_reconciled_periods: Vec::new(),
        }
    }

    /// The entry's effective period.
    #[must_use]
    pub const fn period(&self) -> Period {
        self.declaration.period
    }

    /// Drops everything computed from the declaration.
    pub fn clear_computed(&mut self) {
        self.offset_periods.clear();
        self.preview_reconciled_periods.clear();
    }
}

/// Inserts or replaces `declaration` among `entries`.
///
/// An entry with the same id is replaced in place and keeps its period.
/// Otherwise the declaration is placed at its start month: the entry before
/// it is cut to end the month before, and it ends where the next entry (if
/// any) begins. An existing entry starting in the same month is superseded.
///
/// `relevant_months_in_year` is derived from the first entry's start month
/// and carried forward to every later entry.
#[must_use]
pub fn upsert_declaration(
    entries: &[IncomeEntry],
    mut declaration: IncomeDeclaration,
) -> Vec<IncomeEntry> {
    let mut updated: Vec<IncomeEntry> = entries.to_vec();

    if let Some(existing) = updated
        .iter_mut()
        .find(|entry| entry.declaration.id == declaration.id)
    {
        declaration.period = existing.declaration.period;
        *existing = IncomeEntry::new(declaration);
    } else {
        let from: YearMonth = declaration.effective_from();
        updated.retain(|entry| entry.declaration.effective_from() != from);
        let position: usize = updated
            .iter()
            .position(|entry| entry.declaration.effective_from() > from)
            .unwrap_or(updated.len());
        updated.insert(position, IncomeEntry::new(declaration));
    }

    link_periods(&mut updated);
    carry_relevant_months(&mut updated);
    updated
}

fn link_periods(entries: &mut [IncomeEntry]) {
    let next_starts: Vec<Option<YearMonth>> = entries
        .iter()
        .skip(1)
        .map(|entry| Some(entry.declaration.effective_from()))
        .chain(std::iter::once(None))
        .collect();

    for (entry, next_start) in entries.iter_mut().zip(next_starts) {
        let from: YearMonth = entry.declaration.effective_from();
        entry.declaration.period = match next_start {
            Some(next) => Period::bounded(from, next.previous()),
            None => Period::open(from),
        };
    }
}

fn carry_relevant_months(entries: &mut [IncomeEntry]) {
    let Some(first) = entries.first() else {
        return;
    };
    let relevant: u8 = first.declaration.effective_from().remaining_in_year();
    for entry in entries {
        entry.declaration.relevant_months_in_year = relevant;
    }
}

/// The entry in force in `month`, if any.
#[must_use]
pub fn active_entry(entries: &[IncomeEntry], month: YearMonth) -> Option<&IncomeEntry> {
    entries
        .iter()
        .rev()
        .find(|entry| entry.declaration.effective_from() <= month)
}
