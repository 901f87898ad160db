// Test data factories

use chrono::NaiveDate;
use contas_obra::core::money::AmountInput;
use contas_obra::modules::audit::services::Actor;
use contas_obra::modules::invoices::models::InvoiceForm;
use contas_obra::modules::locations::models::Location;
use contas_obra::AppState;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Date the test clock is pinned to
pub fn today() -> NaiveDate {
    date(2024, 3, 15)
}

pub async fn seed_location(state: &AppState, name: &str) -> Location {
    state
        .locations
        .create(Actor::system(), name)
        .await
        .expect("location should be created")
        .value
}

/// Installment-based invoice issued on 2024-01-01, 30/30 day terms
pub fn nota_form(number: &str, supplier: &str, total: &str, location_id: i64, count: u32) -> InvoiceForm {
    InvoiceForm {
        invoice_number: Some(number.to_string()),
        supplier: Some(supplier.to_string()),
        total_value: Some(AmountInput::Text(total.to_string())),
        issue_date: Some(date(2024, 1, 1)),
        location_id: Some(location_id),
        is_installment: true,
        installment_count: Some(count),
        days_to_first: Some(30),
        interval_days: Some(30),
        ..Default::default()
    }
}

/// Single-payment invoice issued on the given date
pub fn single_payment_form(number: &str, supplier: &str, total: &str, location_id: i64, issued: NaiveDate) -> InvoiceForm {
    InvoiceForm {
        invoice_number: Some(number.to_string()),
        supplier: Some(supplier.to_string()),
        total_value: Some(AmountInput::Text(total.to_string())),
        issue_date: Some(issued),
        location_id: Some(location_id),
        is_installment: false,
        ..Default::default()
    }
}
