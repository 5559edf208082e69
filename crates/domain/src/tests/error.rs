// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, YearMonth};
use time::Month;

#[test]
fn test_domain_error_display() {
    let from: YearMonth = YearMonth::new(2025, Month::March);

    let err: DomainError = DomainError::FirstReassessmentNotJanuary { from };
    assert_eq!(
        format!("{err}"),
        "The first re-assessment in a new year must start in January, but starts 2025-03"
    );

    let err: DomainError = DomainError::BackdatedBeforeLatest {
        from,
        latest: YearMonth::new(2025, Month::June),
    };
    assert_eq!(
        format!("{err}"),
        "Declaration from 2025-03 precedes the latest declaration from 2025-06"
    );

    let err: DomainError = DomainError::InvalidYearMonth(String::from("2025-13"));
    assert_eq!(format!("{err}"), "Invalid month '2025-13': expected YYYY-MM");
}

#[test]
fn test_codes_are_stable() {
    let from: YearMonth = YearMonth::new(2025, Month::March);

    assert_eq!(
        DomainError::DeductionChangedOnReassessment { from }.code(),
        "DeductionChangedOnReassessment"
    );
    assert_eq!(
        DomainError::DeclarationOutsideYear { from, year: 2024 }.code(),
        "DeclarationOutsideYear"
    );
}

#[test]
fn test_only_rule_violations_are_validation_errors() {
    let from: YearMonth = YearMonth::new(2025, Month::March);

    assert!(DomainError::DeductionNotAllowedForFullYear { from }.is_validation());
    assert!(
        DomainError::BackdatedBeforeLatest {
            from,
            latest: from.next()
        }
        .is_validation()
    );
    assert!(!DomainError::DeclarationOutsideYear { from, year: 2024 }.is_validation());
    assert!(!DomainError::InvalidYearMonth(String::from("x")).is_validation());
}
