// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use avkorting_domain::DomainError;

/// Failure reported by an external collaborator, carried unmodified.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during ledger transitions.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// A recomputation targets a year without any income declaration.
    #[error("No income declaration exists for year {year}")]
    MissingIncomeDeclaration {
        /// The year that was targeted.
        year: i32,
    },
    /// No ledger in the decision history holds a settlement for a year.
    #[error("No ledger in the decision history holds a settlement for year {year}")]
    MissingYearSettlement {
        /// The year that could not be repaired.
        year: i32,
    },
    /// The offset evaluator or the ledger lookup failed.
    #[error("External collaborator failed: {0}")]
    Collaborator(#[source] CollaboratorError),
}

impl CoreError {
    /// Wraps a collaborator's error.
    #[must_use]
    pub fn collaborator<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Collaborator(Box::new(err))
    }

    /// Whether the request was rejected by input validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::DomainViolation(err) if err.is_validation())
    }
}
