//! Money, tax id and status rules
//!
//! BRL text handling, CNPJ masking and the effective installment status are
//! shared by every form and listing, so they get property coverage here.

use chrono::{Duration, NaiveDate};
use contas_obra::core::money::{format_brl, parse_brl, round_cents, validate_amount, AmountInput};
use contas_obra::core::tax_id::{cnpj_digits, format_cnpj, is_complete_cnpj};
use contas_obra::installments::models::InstallmentStatus;
use contas_obra::installments::services::resolve_status;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn arb_status() -> impl Strategy<Value = InstallmentStatus> {
    prop_oneof![
        Just(InstallmentStatus::Pendente),
        Just(InstallmentStatus::Paga),
        Just(InstallmentStatus::Vencida),
    ]
}

proptest! {
    #[test]
    fn prop_formatted_amount_parses_back(cents in 0i64..=1_000_000_000_00) {
        let amount = Decimal::new(cents, 2);
        let text = format_brl(amount);

        prop_assert!(text.starts_with("R$ "));
        prop_assert_eq!(parse_brl(&text).unwrap(), amount);
    }

    #[test]
    fn prop_cnpj_mask_keeps_digits(input in "[0-9./ -]{0,24}") {
        let masked = format_cnpj(&input);

        prop_assert_eq!(cnpj_digits(&masked), cnpj_digits(&input));
        prop_assert_eq!(format_cnpj(&masked), masked.clone());
        prop_assert_eq!(is_complete_cnpj(&masked), cnpj_digits(&input).len() == 14);
    }

    #[test]
    fn prop_paid_is_sticky(offset in -400i64..=400) {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let due = today + Duration::days(offset);

        prop_assert_eq!(resolve_status(due, InstallmentStatus::Paga, today), InstallmentStatus::Paga);
    }

    #[test]
    fn prop_unpaid_status_follows_due_date(offset in -400i64..=400, stored in arb_status()) {
        prop_assume!(stored != InstallmentStatus::Paga);
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let due = today + Duration::days(offset);

        let expected = if offset < 0 {
            InstallmentStatus::Vencida
        } else {
            InstallmentStatus::Pendente
        };
        prop_assert_eq!(resolve_status(due, stored, today), expected);
    }
}

#[test]
fn test_complete_cnpj_is_masked_and_valid() {
    let formatted = format_cnpj("12345678000190");

    assert_eq!(formatted, "12.345.678/0001-90");
    assert!(is_complete_cnpj(&formatted));
}

#[test]
fn test_short_cnpj_stays_incomplete() {
    let formatted = format_cnpj("1234");

    assert_eq!(formatted, "12.34");
    assert!(!is_complete_cnpj(&formatted));
}

#[test]
fn test_overlong_cnpj_truncated_to_fourteen_digits() {
    assert_eq!(format_cnpj("123456780001909999"), "12.345.678/0001-90");
}

#[test]
fn test_typed_amounts() {
    assert_eq!(parse_brl("R$ 1.500,00").unwrap(), dec!(1500.00));
    assert_eq!(parse_brl("1500,5").unwrap(), dec!(1500.5));
    assert_eq!(parse_brl("1500.50").unwrap(), dec!(1500.50));
    assert!(parse_brl("mil reais").unwrap_err().violations().is_some());
}

#[test]
fn test_amount_input_accepts_text_or_exact() {
    assert_eq!(
        AmountInput::Text("2.000,10".to_string()).resolve().unwrap(),
        dec!(2000.10)
    );
    assert_eq!(AmountInput::Exact(dec!(12.34)).resolve().unwrap(), dec!(12.34));
}

#[test]
fn test_brl_grouping() {
    assert_eq!(format_brl(dec!(1234567.8)), "R$ 1.234.567,80");
    assert_eq!(format_brl(dec!(0.5)), "R$ 0,50");
}

#[test]
fn test_cents_rounding_and_validation() {
    assert_eq!(round_cents(dec!(2.675)), dec!(2.68));
    assert_eq!(round_cents(dec!(2.665)), dec!(2.66));
    assert!(validate_amount(dec!(0.01)).is_ok());
    assert!(validate_amount(dec!(0.001)).is_err());
}

#[test]
fn test_due_today_is_still_pending() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    assert_eq!(
        resolve_status(today, InstallmentStatus::Vencida, today),
        InstallmentStatus::Pendente
    );
}
