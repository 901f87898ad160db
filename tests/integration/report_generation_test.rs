//! Monthly report, dashboard and summary views

#[path = "../helpers/mod.rs"]
mod helpers;

use contas_obra::installments::models::InstallmentStatus;
use contas_obra::invoices::models::MaterialStatus;
use contas_obra::modules::reports::models::StatusCounts;
use helpers::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 1500.00 in three installments (due 01-31, 03-01, 03-31, the second
/// paid) and a 300.00 single payment in use on site, due 03-10
async fn seed(app: &TestApp) {
    let local = seed_location(&app.state, "Obra Centro").await;

    let parcelado = app
        .state
        .invoices
        .create(app.actor(), nota_form("A-1", "ACME", "1.500,00", local.id, 3), None)
        .await
        .unwrap()
        .value;
    app.state
        .installments
        .mark_paid(app.actor(), parcelado.installments[1].id, Some(date(2024, 3, 1)))
        .await
        .unwrap();

    let mut avista = single_payment_form("B-1", "Areia Fina", "300,00", local.id, date(2024, 3, 10));
    avista.material_status = MaterialStatus::EmUso;
    app.state
        .invoices
        .create(app.actor(), avista, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_monthly_report_totals_by_status() {
    let app = TestApp::new();
    seed(&app).await;

    let report = app.state.reports.monthly_report(2024, 3).await.unwrap();

    assert_eq!(report.installments.len(), 3);
    assert_eq!(report.total_pago, dec!(500.00));
    assert_eq!(report.total_pendente, dec!(500.00));
    assert_eq!(report.total_vencido, dec!(300.00));
    assert!(report
        .installments
        .iter()
        .all(|i| i.due_date >= date(2024, 3, 1) && i.due_date < date(2024, 4, 1)));
}

#[tokio::test]
async fn test_month_without_installments() {
    let app = TestApp::new();
    seed(&app).await;

    let report = app.state.reports.monthly_report(2024, 7).await.unwrap();

    assert!(report.installments.is_empty());
    assert_eq!(report.total_pago, Decimal::ZERO);
    assert_eq!(report.total_pendente, Decimal::ZERO);
    assert_eq!(report.total_vencido, Decimal::ZERO);
}

#[tokio::test]
async fn test_invalid_month_rejected() {
    let app = TestApp::new();

    let err = app.state.reports.monthly_report(2024, 13).await.unwrap_err();

    assert!(err.violations().is_some());
}

#[tokio::test]
async fn test_dashboard_counts_and_views() {
    let app = TestApp::new();
    seed(&app).await;

    let dashboard = app.state.reports.dashboard().await.unwrap();

    assert_eq!(dashboard.invoice_count, 2);
    assert_eq!(dashboard.invoice_total, dec!(1800.00));
    assert_eq!(
        dashboard.installments,
        StatusCounts {
            pendente: 1,
            paga: 1,
            vencida: 2,
        }
    );
    assert_eq!(dashboard.summary.total_em_estoque, dec!(1500.00));
    assert_eq!(dashboard.summary.total_em_uso, dec!(300.00));
    assert_eq!(dashboard.summary.total_de_notas, dec!(1800.00));
    assert_eq!(dashboard.summary.total_a_pagar, dec!(1300.00));
}

#[tokio::test]
async fn test_summary_follows_material_status_changes() {
    let app = TestApp::new();
    seed(&app).await;
    let installments = app
        .state
        .installments
        .list(&Default::default())
        .await
        .unwrap();
    let first = installments
        .iter()
        .find(|i| i.number == 1 && i.status == InstallmentStatus::Vencida && i.value == dec!(500.00))
        .unwrap();

    app.state
        .installments
        .set_material_status(app.actor(), first.id, MaterialStatus::EmUso)
        .await
        .unwrap();

    let summary = app.state.reports.summary().await.unwrap();
    assert_eq!(summary.total_em_estoque, dec!(1000.00));
    assert_eq!(summary.total_em_uso, dec!(800.00));
    assert_eq!(summary.total_em_estoque + summary.total_em_uso, summary.total_de_notas);
}
