//! Reconciliation tests
//!
//! After a manual edit the schedule must still sum to the invoice total,
//! installments before the edited one keep their dates and later ones are
//! re-anchored on the edited due date.

use chrono::{Duration, NaiveDate};
use contas_obra::core::AppError;
use contas_obra::installments::models::{schedule_total, InstallmentEdit, InstallmentStatus, ScheduleTerms};
use contas_obra::installments::services::{InstallmentCalculator, InstallmentReconciler, SchedulePreview};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn terms(total: Decimal, count: u32) -> ScheduleTerms {
    ScheduleTerms {
        total_value: total,
        count,
        days_to_first: 30,
        interval_days: 30,
        issue_date: date(2024, 1, 1),
    }
}

fn edit(index: usize, value: Decimal, due_date: NaiveDate) -> InstallmentEdit {
    InstallmentEdit {
        index,
        value,
        due_date,
        material_status: None,
    }
}

/// Terms with at least two installments, an edit position and an edited
/// value anywhere in (0, total)
fn arb_edit() -> impl Strategy<Value = (ScheduleTerms, usize, Decimal, i64)> {
    (10_000i64..=50_000_000, 2u32..=24)
        .prop_flat_map(|(total_cents, count)| {
            (
                Just(total_cents),
                Just(count),
                0..count as usize,
                1i64..total_cents,
                -20i64..=60,
            )
        })
        .prop_map(|(total_cents, count, index, value_cents, shift)| {
            (
                terms(Decimal::new(total_cents, 2), count),
                index,
                Decimal::new(value_cents, 2),
                shift,
            )
        })
}

proptest! {
    #[test]
    fn prop_reconciled_schedule_sums_to_total((t, index, value, shift) in arb_edit()) {
        let schedule = InstallmentCalculator::schedule(&t).unwrap();
        let due = schedule[index].due_date + Duration::days(shift);

        let result = InstallmentReconciler::reconcile(&schedule, &edit(index, value, due), &t).unwrap();

        prop_assert_eq!(result.len(), schedule.len());
        prop_assert_eq!(schedule_total(&result), t.total_value);
        prop_assert_eq!(result[index].value, value);
        prop_assert!(result.iter().all(|i| i.value >= Decimal::ZERO));
    }

    #[test]
    fn prop_dates_reanchor_only_after_edit((t, index, value, shift) in arb_edit()) {
        let schedule = InstallmentCalculator::schedule(&t).unwrap();
        let due = schedule[index].due_date + Duration::days(shift);

        let result = InstallmentReconciler::reconcile(&schedule, &edit(index, value, due), &t).unwrap();

        for (position, installment) in result.iter().enumerate() {
            if position < index {
                prop_assert_eq!(installment.due_date, schedule[position].due_date);
            } else {
                let expected = due + Duration::days((position - index) as i64 * i64::from(t.interval_days));
                prop_assert_eq!(installment.due_date, expected);
            }
            prop_assert_eq!(installment.number, schedule[position].number);
        }
    }
}

#[test]
fn test_editing_first_of_three_splits_remainder() {
    let t = terms(dec!(900.00), 3);
    let schedule = InstallmentCalculator::schedule(&t).unwrap();

    let result =
        InstallmentReconciler::reconcile(&schedule, &edit(0, dec!(400.00), date(2024, 1, 31)), &t)
            .unwrap();

    let values: Vec<_> = result.iter().map(|i| i.value).collect();
    assert_eq!(values, vec![dec!(400.00), dec!(250.00), dec!(250.00)]);
    assert_eq!(schedule_total(&result), dec!(900.00));
}

#[test]
fn test_moving_middle_installment_shifts_later_ones() {
    let t = terms(dec!(900.00), 3);
    let schedule = InstallmentCalculator::schedule(&t).unwrap();

    let result =
        InstallmentReconciler::reconcile(&schedule, &edit(1, dec!(300.00), date(2024, 3, 20)), &t)
            .unwrap();

    assert_eq!(result[0].due_date, date(2024, 1, 31));
    assert_eq!(result[1].due_date, date(2024, 3, 20));
    assert_eq!(result[2].due_date, date(2024, 4, 19));
}

#[test]
fn test_editing_last_installment_date_has_no_downstream_effect() {
    let t = terms(dec!(900.00), 3);
    let schedule = InstallmentCalculator::schedule(&t).unwrap();

    let result =
        InstallmentReconciler::reconcile(&schedule, &edit(2, dec!(100.00), date(2024, 6, 1)), &t)
            .unwrap();

    assert_eq!(result[0].due_date, schedule[0].due_date);
    assert_eq!(result[1].due_date, schedule[1].due_date);
    assert_eq!(result[0].value, dec!(400.00));
    assert_eq!(result[1].value, dec!(400.00));
    assert_eq!(result[2].value, dec!(100.00));
}

#[test]
fn test_rounding_drift_lands_on_last_other_installment() {
    let t = terms(dec!(1000.00), 4);
    let schedule = InstallmentCalculator::schedule(&t).unwrap();

    // 899.99 / 3 rounds to 300.00, one cent over the total
    let result =
        InstallmentReconciler::reconcile(&schedule, &edit(0, dec!(100.01), date(2024, 1, 31)), &t)
            .unwrap();

    assert_eq!(result[1].value, dec!(300.00));
    assert_eq!(result[2].value, dec!(300.00));
    assert_eq!(result[3].value, dec!(299.99));
    assert_eq!(schedule_total(&result), dec!(1000.00));
}

#[test]
fn test_paid_installments_are_redistributed_too() {
    let t = terms(dec!(900.00), 3);
    let mut schedule = InstallmentCalculator::schedule(&t).unwrap();
    schedule[2].status = InstallmentStatus::Paga;

    let result =
        InstallmentReconciler::reconcile(&schedule, &edit(0, dec!(500.00), date(2024, 1, 31)), &t)
            .unwrap();

    assert_eq!(result[2].value, dec!(200.00));
    assert_eq!(result[2].status, InstallmentStatus::Paga);
}

#[test]
fn test_edit_leaving_cents_for_many_installments() {
    let t = terms(dec!(100.00), 24);
    let schedule = InstallmentCalculator::schedule(&t).unwrap();

    let result =
        InstallmentReconciler::reconcile(&schedule, &edit(0, dec!(99.90), date(2024, 1, 31)), &t)
            .unwrap();

    assert_eq!(result[0].value, dec!(99.90));
    assert_eq!(schedule_total(&result), dec!(100.00));
    assert!(result.iter().all(|i| i.value >= Decimal::ZERO));
    assert_eq!(result[23].value, dec!(0.10));
}

#[test]
fn test_single_installment_edit() {
    let t = terms(dec!(750.00), 1);
    let schedule = InstallmentCalculator::schedule(&t).unwrap();

    let moved =
        InstallmentReconciler::reconcile(&schedule, &edit(0, dec!(750.00), date(2024, 2, 10)), &t)
            .unwrap();
    assert_eq!(moved[0].due_date, date(2024, 2, 10));

    let changed =
        InstallmentReconciler::reconcile(&schedule, &edit(0, dec!(700.00), date(2024, 2, 10)), &t);
    assert!(matches!(changed, Err(AppError::Consistency(_))));
}

#[test]
fn test_edit_equal_to_total_rejected() {
    let t = terms(dec!(900.00), 3);
    let schedule = InstallmentCalculator::schedule(&t).unwrap();

    let result =
        InstallmentReconciler::reconcile(&schedule, &edit(1, dec!(900.00), date(2024, 3, 1)), &t);

    let err = result.unwrap_err();
    assert!(err.violations().is_some());
}

#[test]
fn test_non_positive_or_fractional_cent_values_rejected() {
    let t = terms(dec!(900.00), 3);
    let schedule = InstallmentCalculator::schedule(&t).unwrap();

    for value in [dec!(0), dec!(-10.00), dec!(10.005)] {
        let result =
            InstallmentReconciler::reconcile(&schedule, &edit(0, value, date(2024, 1, 31)), &t);
        assert!(matches!(result, Err(AppError::Validation(_))), "value {}", value);
    }
}

#[test]
fn test_preview_rejected_edit_leaves_schedule_untouched() {
    let mut preview = SchedulePreview::compute(terms(dec!(900.00), 3)).unwrap();
    let before = preview.clone();

    let result = preview.apply_edit(&edit(0, dec!(950.00), date(2024, 1, 31)));

    assert!(result.is_err());
    assert_eq!(preview, before);
}

#[test]
fn test_preview_edits_accumulate() {
    let mut preview = SchedulePreview::compute(terms(dec!(900.00), 3)).unwrap();

    preview
        .apply_edit(&edit(0, dec!(400.00), date(2024, 1, 31)))
        .unwrap();
    preview
        .apply_edit(&edit(1, dec!(200.00), date(2024, 3, 1)))
        .unwrap();

    let values: Vec<_> = preview.installments.iter().map(|i| i.value).collect();
    // The second edit redistributes over every other installment
    assert_eq!(values, vec![dec!(350.00), dec!(200.00), dec!(350.00)]);
    assert_eq!(preview.total(), dec!(900.00));
}
