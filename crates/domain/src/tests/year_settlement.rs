// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Arrears, BuildOptions, DeclarationId, GrossBenefitPeriod, IncomeDeclaration, IncomeEntry,
    OffsetCalculator, OffsetEvaluation, Period, ReconciledPeriod, ReconciliationKind, YearMonth,
    YearSettlement, build_year, divide_rounded, upsert_declaration,
};
use std::collections::HashMap;
use std::convert::Infallible;
use time::Month;

struct FlatOffset(i64);

impl OffsetCalculator for FlatOffset {
    type Error = Infallible;

    fn evaluate(
        &self,
        _declaration: &IncomeDeclaration,
        _period: &Period,
    ) -> Result<OffsetEvaluation, Self::Error> {
        Ok(OffsetEvaluation {
            amount: self.0,
            trace: String::from("flat"),
        })
    }
}

fn ym(year: i32, month: Month) -> YearMonth {
    YearMonth::new(year, month)
}

fn gross(period: Period, amount: i64) -> GrossBenefitPeriod {
    GrossBenefitPeriod {
        period,
        amount,
        benefit_calculation_ref: String::from("beregning"),
    }
}

fn settled(period: Period, gross_amount: i64, net: i64) -> ReconciledPeriod {
    ReconciledPeriod {
        period,
        gross_amount,
        offset_amount: gross_amount - net,
        net_before_arrears: net,
        arrears: None,
        net_after_arrears: net,
        kind: ReconciliationKind::YearSettlement,
        income_declaration_ref: None,
    }
}

fn entries_from_january() -> Vec<IncomeEntry> {
    upsert_declaration(
        &[],
        IncomeDeclaration::new(ym(2024, Month::January), 72_000, "test"),
    )
}

fn options(kind: ReconciliationKind, effective_month: YearMonth) -> BuildOptions {
    BuildOptions {
        kind,
        effective_month,
        stop_from: None,
        open_ended: true,
    }
}

/// A 2024 settlement that paid 10000 gross with `net` every month.
fn paid_year(net: i64) -> YearSettlement {
    let mut base: YearSettlement = YearSettlement::new(ym(2024, Month::January));
    base.gross_benefit_periods = vec![gross(Period::open(ym(2024, Month::January)), 10_000)];
    base.settled_periods = vec![settled(Period::open(ym(2024, Month::January)), 10_000, net)];
    base
}

#[test]
fn test_divide_rounded_rounds_half_away_from_zero() {
    assert_eq!(divide_rounded(2000, 4), 500);
    assert_eq!(divide_rounded(10, 4), 3);
    assert_eq!(divide_rounded(-10, 4), -3);
    assert_eq!(divide_rounded(9, 4), 2);
    assert_eq!(divide_rounded(-9, 4), -2);
    assert_eq!(divide_rounded(1, 3), 0);
}

#[test]
fn test_preview_keeps_final_timeline() {
    let mut base: YearSettlement = paid_year(10_000);
    base.final_reconciled_periods = base.settled_periods.clone();

    let built: YearSettlement = build_year(
        &base,
        &[],
        &entries_from_january(),
        options(
            ReconciliationKind::ExpectedIncomePreview,
            ym(2024, Month::January),
        ),
        &FlatOffset(600),
    )
    .unwrap();

    assert_eq!(built.final_reconciled_periods, base.final_reconciled_periods);
    let preview: &[ReconciledPeriod] = &built.income_entries[0].preview_reconciled_periods;
    assert_eq!(preview.len(), 1);
    assert_eq!(preview[0].net_before_arrears, 9400);
    assert_eq!(preview[0].kind, ReconciliationKind::ExpectedIncomePreview);
}

#[test]
fn test_net_never_drops_below_zero() {
    let mut base: YearSettlement = YearSettlement::new(ym(2024, Month::January));
    base.gross_benefit_periods = vec![gross(Period::open(ym(2024, Month::January)), 500)];

    let built: YearSettlement = build_year(
        &base,
        &[],
        &entries_from_january(),
        options(ReconciliationKind::YearSettlement, ym(2024, Month::January)),
        &FlatOffset(600),
    )
    .unwrap();

    assert_eq!(built.final_reconciled_periods.len(), 1);
    assert_eq!(built.final_reconciled_periods[0].offset_amount, 600);
    assert_eq!(built.final_reconciled_periods[0].net_after_arrears, 0);
}

#[test]
fn test_overpaid_months_are_recovered_from_remaining_months() {
    let built: YearSettlement = build_year(
        &paid_year(10_000),
        &[],
        &entries_from_january(),
        options(ReconciliationKind::YearSettlement, ym(2024, Month::July)),
        &FlatOffset(600),
    )
    .unwrap();
    let periods: &[ReconciledPeriod] = &built.final_reconciled_periods;

    assert_eq!(periods.len(), 2);
    assert_eq!(
        periods[0].period,
        Period::bounded(ym(2024, Month::January), ym(2024, Month::June))
    );
    assert_eq!(periods[0].net_after_arrears, 10_000);
    assert_eq!(
        periods[1].period,
        Period::bounded(ym(2024, Month::July), ym(2024, Month::December))
    );
    assert_eq!(periods[1].net_before_arrears, 9400);
    assert_eq!(periods[1].net_after_arrears, 8800);
    let arrears: &Arrears = periods[1].arrears.as_ref().unwrap();
    assert_eq!(arrears.total_amount, 3600);
    assert_eq!(arrears.apportioned_amount, 600);
}

#[test]
fn test_underpaid_months_raise_remaining_payments() {
    let built: YearSettlement = build_year(
        &paid_year(9000),
        &[],
        &entries_from_january(),
        options(ReconciliationKind::YearSettlement, ym(2024, Month::July)),
        &FlatOffset(0),
    )
    .unwrap();
    let remaining: &ReconciledPeriod = built.final_reconciled_periods.last().unwrap();

    assert_eq!(remaining.arrears.as_ref().unwrap().total_amount, -6000);
    assert_eq!(remaining.net_before_arrears, 10_000);
    assert_eq!(remaining.net_after_arrears, 11_000);
}

#[test]
fn test_months_without_baseline_are_recomputed_without_arrears() {
    let mut base: YearSettlement = paid_year(10_000);
    base.settled_periods.clear();

    let built: YearSettlement = build_year(
        &base,
        &[],
        &entries_from_january(),
        options(ReconciliationKind::YearSettlement, ym(2024, Month::July)),
        &FlatOffset(600),
    )
    .unwrap();
    let periods: &[ReconciledPeriod] = &built.final_reconciled_periods;

    assert!(periods.iter().all(|p| p.arrears.is_none()));
    assert!(periods.iter().all(|p| p.net_after_arrears == 9400));
    assert!(periods.last().unwrap().period.is_open());
}

#[test]
fn test_incoming_gross_replaces_from_its_first_month() {
    let built: YearSettlement = build_year(
        &paid_year(10_000),
        &[gross(Period::open(ym(2024, Month::May)), 11_000)],
        &entries_from_january(),
        options(ReconciliationKind::ExpectedIncomePreview, ym(2024, Month::May)),
        &FlatOffset(0),
    )
    .unwrap();

    assert_eq!(built.gross_benefit_periods.len(), 2);
    assert_eq!(
        built.gross_benefit_periods[0].period,
        Period::bounded(ym(2024, Month::January), ym(2024, Month::April))
    );
    assert_eq!(
        built.gross_benefit_periods[1].period,
        Period::open(ym(2024, Month::May))
    );
}

#[test]
fn test_closed_year_bounds_gross_at_december() {
    let mut opts: BuildOptions =
        options(ReconciliationKind::YearSettlement, ym(2024, Month::January));
    opts.open_ended = false;

    let built: YearSettlement = build_year(
        &paid_year(10_000),
        &[],
        &entries_from_january(),
        opts,
        &FlatOffset(0),
    )
    .unwrap();

    assert_eq!(
        built.gross_benefit_periods[0].period.to(),
        Some(ym(2024, Month::December))
    );
    assert_eq!(
        built.final_reconciled_periods.last().unwrap().period.to(),
        Some(ym(2024, Month::December))
    );
}

#[test]
fn test_close_at_year_end_bounds_every_period() {
    let mut settlement: YearSettlement = build_year(
        &paid_year(10_000),
        &[],
        &entries_from_january(),
        options(ReconciliationKind::YearSettlement, ym(2024, Month::January)),
        &FlatOffset(600),
    )
    .unwrap();

    settlement.close_at_year_end();

    assert!(
        settlement
            .final_reconciled_periods
            .iter()
            .chain(settlement.settled_periods.iter())
            .all(|p| p.period.to() == Some(ym(2024, Month::December)))
    );
    assert!(
        settlement
            .income_entries
            .iter()
            .all(|e| !e.period().is_open() && e.offset_periods.iter().all(|o| !o.period.is_open()))
    );
}

#[test]
fn test_carried_settlement_records_renamed_declarations() {
    let settlement: YearSettlement = build_year(
        &paid_year(10_000),
        &[],
        &entries_from_january(),
        options(ReconciliationKind::YearSettlement, ym(2024, Month::January)),
        &FlatOffset(600),
    )
    .unwrap();
    let old_id: DeclarationId = settlement.income_entries[0].declaration.id;
    let mut renamed: HashMap<DeclarationId, DeclarationId> = HashMap::new();

    let carried: YearSettlement =
        settlement.carried_into_new_case(ym(2024, Month::June), &mut renamed);

    let new_id: DeclarationId = carried.income_entries[0].declaration.id;
    assert_eq!(renamed.get(&old_id), Some(&new_id));
    assert_ne!(old_id, new_id);
    assert_eq!(
        carried.settled_periods[0].income_declaration_ref,
        Some(new_id)
    );
    assert_eq!(
        carried.gross_benefit_periods[0].period,
        Period::open(ym(2024, Month::June))
    );
}
