// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::ledger::IncomeEntry;
use crate::period::YearMonth;
use crate::types::{CaseType, IncomeDeclaration};
use crate::year_settlement::YearSettlement;

/// Validates an incoming income declaration before it touches the ledger.
///
/// This function is pure, deterministic, and has no side effects.
///
/// # Arguments
///
/// * `declaration` - The declaration to validate
/// * `case_type` - The kind of case registering it
/// * `settlement` - The existing settlement for the declaration's year, if any
/// * `latest` - The latest declaration anywhere in the ledger, if any
///
/// # Errors
///
/// Returns an error if:
/// - A re-assessment opens a new year later than January
/// - The declaration takes effect before the latest declaration
/// - Year deductions are given for a full year from January, or on the
///   first re-assessment declaration of a year
/// - A re-assessment changes the year deductions of the declaration it amends
pub fn validate_declaration(
    declaration: &IncomeDeclaration,
    case_type: CaseType,
    settlement: Option<&YearSettlement>,
    latest: Option<&IncomeDeclaration>,
) -> Result<(), DomainError> {
    let from: YearMonth = declaration.effective_from();
    let opens_year: bool = settlement.is_none_or(|s| s.income_entries.is_empty());
    let first_reassessment_of_year: bool = case_type == CaseType::Reassessment && opens_year;

    // Rule: a re-assessment that opens a year covers it from January
    if first_reassessment_of_year && from.month() != time::Month::January {
        return Err(DomainError::FirstReassessmentNotJanuary { from });
    }

    // Rule: no backdating behind the latest declaration (in-place edits excepted)
    if let Some(latest) = latest
        && latest.id != declaration.id
        && from < latest.effective_from()
    {
        return Err(DomainError::BackdatedBeforeLatest {
            from,
            latest: latest.effective_from(),
        });
    }

    // Rule: no year deductions for a full year or a year opened by re-assessment
    if declaration.has_year_deduction()
        && (declaration.covers_full_year() || first_reassessment_of_year)
    {
        return Err(DomainError::DeductionNotAllowedForFullYear { from });
    }

    // Rule: a re-assessment keeps the deductions of the declaration it amends
    if case_type == CaseType::Reassessment
        && let Some(amended) =
            settlement.and_then(|s| amended_entry(&s.income_entries, declaration))
    {
        let amended: &IncomeDeclaration = &amended.declaration;
        if amended.year_deduction != declaration.year_deduction
            || amended.foreign_year_deduction != declaration.foreign_year_deduction
        {
            return Err(DomainError::DeductionChangedOnReassessment { from });
        }
    }

    Ok(())
}

/// The last entry of the year that `declaration` does not replace in place.
fn amended_entry<'a>(
    entries: &'a [IncomeEntry],
    declaration: &IncomeDeclaration,
) -> Option<&'a IncomeEntry> {
    entries
        .iter()
        .rev()
        .find(|entry| entry.declaration.id != declaration.id)
}
