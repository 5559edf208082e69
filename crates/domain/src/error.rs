// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::period::YearMonth;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The first re-assessment declaration in a new year starts after January.
    FirstReassessmentNotJanuary {
        /// Start of the rejected declaration.
        from: YearMonth,
    },
    /// A declaration takes effect before the latest existing declaration.
    BackdatedBeforeLatest {
        /// Start of the rejected declaration.
        from: YearMonth,
        /// Start of the latest existing declaration.
        latest: YearMonth,
    },
    /// Year deductions were given where none are allowed.
    DeductionNotAllowedForFullYear {
        /// Start of the rejected declaration.
        from: YearMonth,
    },
    /// A re-assessment changed the year deductions of the declaration it amends.
    DeductionChangedOnReassessment {
        /// Start of the rejected declaration.
        from: YearMonth,
    },
    /// A declaration was submitted for a year other than the target year.
    DeclarationOutsideYear {
        /// Start of the declaration.
        from: YearMonth,
        /// The year being settled.
        year: i32,
    },
    /// A period ends before it starts.
    InvalidPeriod {
        /// First month.
        from: YearMonth,
        /// Last month.
        to: YearMonth,
    },
    /// A month string is not of the form `YYYY-MM`.
    InvalidYearMonth(String),
}

impl DomainError {
    /// Stable machine-readable code for the error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FirstReassessmentNotJanuary { .. } => "FirstReassessmentNotJanuary",
            Self::BackdatedBeforeLatest { .. } => "BackdatedBeforeLatest",
            Self::DeductionNotAllowedForFullYear { .. } => "DeductionNotAllowedForFullYear",
            Self::DeductionChangedOnReassessment { .. } => "DeductionChangedOnReassessment",
            Self::DeclarationOutsideYear { .. } => "DeclarationOutsideYear",
            Self::InvalidPeriod { .. } => "InvalidPeriod",
            Self::InvalidYearMonth(_) => "InvalidYearMonth",
        }
    }

    /// Whether the error rejects caller input that can be corrected and resubmitted.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::FirstReassessmentNotJanuary { .. }
                | Self::BackdatedBeforeLatest { .. }
                | Self::DeductionNotAllowedForFullYear { .. }
                | Self::DeductionChangedOnReassessment { .. }
        )
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstReassessmentNotJanuary { from } => {
                write!(
                    f,
                    "The first re-assessment in a new year must start in January, but starts {from}"
                )
            }
            Self::BackdatedBeforeLatest { from, latest } => {
                write!(
                    f,
                    "Declaration from {from} precedes the latest declaration from {latest}"
                )
            }
            Self::DeductionNotAllowedForFullYear { from } => {
                write!(f, "Declaration from {from} may not carry year deductions")
            }
            Self::DeductionChangedOnReassessment { from } => {
                write!(
                    f,
                    "Declaration from {from} changes year deductions of the declaration it amends"
                )
            }
            Self::DeclarationOutsideYear { from, year } => {
                write!(f, "Declaration from {from} does not belong to year {year}")
            }
            Self::InvalidPeriod { from, to } => {
                write!(f, "Invalid period: {to} is before {from}")
            }
            Self::InvalidYearMonth(raw) => {
                write!(f, "Invalid month '{raw}': expected YYYY-MM")
            }
        }
    }
}

impl std::error::Error for DomainError {}
