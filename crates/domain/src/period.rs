// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Month arithmetic and half-open month intervals.
//!
//! Everything the ledger does happens at month granularity. A `Period`
//! runs from its first month to its last month (inclusive), or is open
//! when it has no last month.

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::str::FromStr;
use time::Month;

/// A calendar month in a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    /// Creates a new `YearMonth`.
    #[must_use]
    pub const fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// Returns the calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month of the year.
    #[must_use]
    pub const fn month(&self) -> Month {
        self.month
    }

    /// Returns the month number, 1 for January through 12 for December.
    #[must_use]
    pub const fn month_number(&self) -> u8 {
        self.month as u8
    }

    /// January of the given year.
    #[must_use]
    pub const fn first_of_year(year: i32) -> Self {
        Self::new(year, Month::January)
    }

    /// December of the given year.
    #[must_use]
    pub const fn last_of_year(year: i32) -> Self {
        Self::new(year, Month::December)
    }

    /// The month after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        match self.month {
            Month::December => Self::new(self.year + 1, Month::January),
            month => Self::new(self.year, month.next()),
        }
    }

    /// The month before this one.
    #[must_use]
    pub fn previous(&self) -> Self {
        match self.month {
            Month::January => Self::new(self.year - 1, Month::December),
            month => Self::new(self.year, month.previous()),
        }
    }

    /// Number of months from `self` up to and including `last`.
    ///
    /// Returns 0 when `last` precedes `self`.
    #[must_use]
    pub fn months_through(&self, last: Self) -> u32 {
        let distance: i64 = last.ordinal() - self.ordinal() + 1;
        u32::try_from(distance).unwrap_or(0)
    }

    /// Months remaining in the calendar year, counting this month.
    #[must_use]
    pub const fn remaining_in_year(&self) -> u8 {
        13 - self.month_number()
    }

    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month_number()) - 1
    }
}

impl PartialOrd for YearMonth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for YearMonth {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month_number())
    }
}

impl FromStr for YearMonth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || DomainError::InvalidYearMonth(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(parse_error)?;
        let year: i32 = year.parse().map_err(|_| parse_error())?;
        let month: u8 = month.parse().map_err(|_| parse_error())?;
        let month: Month = Month::try_from(month).map_err(|_| parse_error())?;

        Ok(Self::new(year, month))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A run of whole months, open-ended when `to` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodRepr")]
pub struct Period {
    from: YearMonth,
    to: Option<YearMonth>,
}

/// Unchecked wire form of a [`Period`].
#[derive(Deserialize)]
struct PeriodRepr {
    from: YearMonth,
    to: Option<YearMonth>,
}

impl TryFrom<PeriodRepr> for Period {
    type Error = DomainError;

    fn try_from(repr: PeriodRepr) -> Result<Self, Self::Error> {
        Self::new(repr.from, repr.to)
    }
}

impl Period {
    /// Creates a new period.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriod` if `to` precedes `from`.
    pub fn new(from: YearMonth, to: Option<YearMonth>) -> Result<Self, DomainError> {
        if let Some(to) = to
            && to < from
        {
            return Err(DomainError::InvalidPeriod { from, to });
        }
        Ok(Self { from, to })
    }

    /// An open period starting at `from`.
    #[must_use]
    pub const fn open(from: YearMonth) -> Self {
        Self { from, to: None }
    }

    /// A bounded period. Callers guarantee `from <= to`.
    pub(crate) const fn bounded(from: YearMonth, to: YearMonth) -> Self {
        Self { from, to: Some(to) }
    }

    /// First month of the period.
    #[must_use]
    pub const fn from(&self) -> YearMonth {
        self.from
    }

    /// Last month of the period, `None` when open.
    #[must_use]
    pub const fn to(&self) -> Option<YearMonth> {
        self.to
    }

    /// Whether the period is unbounded into the future.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.to.is_none()
    }

    /// Whether `month` lies within the period.
    #[must_use]
    pub fn contains(&self, month: YearMonth) -> bool {
        month >= self.from && self.to.is_none_or(|to| month <= to)
    }

    /// Whether the two periods share at least one month.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let starts_before_other_ends: bool = other.to.is_none_or(|to| self.from <= to);
        let other_starts_before_end: bool = self.to.is_none_or(|to| other.from <= to);
        starts_before_other_ends && other_starts_before_end
    }

    /// Moves the start forward to `cutoff`.
    ///
    /// Returns `None` when the period ends before `cutoff`.
    #[must_use]
    pub fn truncate_from(&self, cutoff: YearMonth) -> Option<Self> {
        match self.to {
            Some(to) if cutoff > to => None,
            _ => Some(Self {
                from: self.from.max(cutoff),
                to: self.to,
            }),
        }
    }

    /// Ends the period at `last_month` if it is open or ends later.
    ///
    /// A `last_month` before the start leaves a single-month period at
    /// `from`; callers drop such periods with [`Period::clamp`] instead.
    #[must_use]
    pub fn close_at(&self, last_month: YearMonth) -> Self {
        let to: YearMonth = match self.to {
            Some(to) if to <= last_month => to,
            _ => last_month,
        };
        Self {
            from: self.from,
            to: Some(to.max(self.from)),
        }
    }

    /// Restricts the period to `[first, last]`, or `[first, ..)` when `last`
    /// is `None`. Returns `None` when nothing remains.
    #[must_use]
    pub fn clamp(&self, first: YearMonth, last: Option<YearMonth>) -> Option<Self> {
        let from: YearMonth = self.from.max(first);
        let to: Option<YearMonth> = match (self.to, last) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, bound) => bound,
        };
        match to {
            Some(to) if to < from => None,
            _ => Some(Self { from, to }),
        }
    }
}

/// Whether `b` starts exactly the month after `a` ends.
#[must_use]
pub fn contiguous(a: &Period, b: &Period) -> bool {
    a.to.is_some_and(|to| to.next() == b.from)
}

/// Iterates the months of `[first, last]`.
pub fn months(first: YearMonth, last: YearMonth) -> impl Iterator<Item = YearMonth> {
    std::iter::successors(Some(first), move |month| {
        let next: YearMonth = month.next();
        (next <= last).then_some(next)
    })
    .take_while(move |month| *month <= last)
}
