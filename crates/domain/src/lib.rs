// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod ledger;
mod offset;
mod period;
mod types;
mod validation;
mod year_settlement;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use ledger::{IncomeEntry, active_entry, upsert_declaration};
pub use offset::{OffsetCalculator, OffsetEvaluation};
pub use period::{Period, YearMonth, contiguous, months};
pub use types::{
    Arrears, ArrearsId, CaseRef, CaseType, DeclarationId, Decision, DecisionType,
    GrossBenefitPeriod, IncomeDeclaration, IncomeOffsetPeriod, ReconciledPeriod,
    ReconciliationKind,
};
pub use validation::validate_declaration;
pub use year_settlement::{BuildOptions, YearSettlement, build_year, divide_rounded};
