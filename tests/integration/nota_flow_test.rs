//! Invoice (nota) registration flow
//!
//! Registration validates the form as a whole, stores the invoice with its
//! schedule, compensates when the schedule cannot be stored and records
//! every mutation in the audit log.

#[path = "../helpers/mod.rs"]
mod helpers;

use contas_obra::core::{AppError, Repository};
use contas_obra::installments::models::{InstallmentEdit, InstallmentStatus, ScheduleTerms};
use contas_obra::installments::services::SchedulePreview;
use contas_obra::invoices::models::{InvoiceFilter, MaterialStatus};
use contas_obra::modules::audit::models::{AuditAction, LogFilter};
use contas_obra::modules::audit::services::Actor;
use contas_obra::Store;
use helpers::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_create_nota_stores_even_schedule() {
    let app = TestApp::new();
    let local = seed_location(&app.state, "Obra Centro").await;

    let outcome = app
        .state
        .invoices
        .create(app.actor(), nota_form("000123", "ACME", "1.500,00", local.id, 3), None)
        .await
        .unwrap();

    assert!(outcome.is_clean());
    let detail = outcome.value;
    assert_eq!(detail.invoice.total_value, dec!(1500.00));
    assert_eq!(detail.installments.len(), 3);

    let rows: Vec<_> = detail
        .installments
        .iter()
        .map(|i| (i.number, i.value, i.due_date))
        .collect();
    assert_eq!(
        rows,
        vec![
            (1, dec!(500.00), date(2024, 1, 31)),
            (2, dec!(500.00), date(2024, 3, 1)),
            (3, dec!(500.00), date(2024, 3, 31)),
        ]
    );
    assert!(detail.installments.iter().all(|i| i.invoice_id == detail.invoice.id));

    let logs = app
        .state
        .audit
        .list(&LogFilter {
            table: Some("notas".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, AuditAction::Create);
    assert_eq!(logs[0].record_id, Some(detail.invoice.id));
    assert_eq!(logs[0].user_id, Some(1));
}

#[tokio::test]
async fn test_duplicate_number_for_same_supplier_rejected() {
    let app = TestApp::new();
    let local = seed_location(&app.state, "Obra Centro").await;
    let invoices = &app.state.invoices;

    invoices
        .create(app.actor(), nota_form("000123", "ACME", "900,00", local.id, 3), None)
        .await
        .unwrap();

    let err = invoices
        .create(app.actor(), nota_form("000123", "ACME", "100,00", local.id, 1), None)
        .await
        .unwrap_err();
    assert!(err
        .violations()
        .unwrap()
        .contains("Já existe uma nota com este número para este fornecedor"));

    // Same number from another supplier is a different invoice
    invoices
        .create(app.actor(), nota_form("000123", "Cimentos Sul", "100,00", local.id, 1), None)
        .await
        .unwrap();

    // The check is an exact match
    invoices
        .create(app.actor(), nota_form("000123", "acme", "100,00", local.id, 1), None)
        .await
        .unwrap();

    assert_eq!(invoices.list(&InvoiceFilter::default()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_every_violation_reported_together() {
    let app = TestApp::new();

    let mut form = nota_form("", "ACME", "0,00", 999, 30);
    form.issue_date = Some(date(2024, 3, 16));

    let err = app
        .state
        .invoices
        .create(app.actor(), form, None)
        .await
        .unwrap_err();

    let violations = err.violations().unwrap();
    assert!(violations.contains("Número da nota é obrigatório"));
    assert!(violations.contains("Valor total deve ser maior que zero"));
    assert!(violations.contains("Data de emissão não pode ser futura"));
    assert!(violations.contains("entre 1 e 24"));
    assert!(violations.contains("Local de aplicação não encontrado"));
    assert_eq!(violations.len(), 5);
}

#[tokio::test]
async fn test_edited_preview_becomes_stored_schedule() {
    let app = TestApp::new();
    let local = seed_location(&app.state, "Obra Centro").await;

    let mut preview = SchedulePreview::compute(ScheduleTerms {
        total_value: dec!(900.00),
        count: 3,
        days_to_first: 30,
        interval_days: 30,
        issue_date: date(2024, 1, 1),
    })
    .unwrap();
    preview
        .apply_edit(&InstallmentEdit {
            index: 0,
            value: dec!(400.00),
            due_date: date(2024, 2, 5),
            material_status: Some(MaterialStatus::EmUso),
        })
        .unwrap();

    let detail = app
        .state
        .invoices
        .create(
            app.actor(),
            nota_form("55", "ACME", "900,00", local.id, 3),
            Some(preview.installments),
        )
        .await
        .unwrap()
        .value;

    let values: Vec<_> = detail.installments.iter().map(|i| i.value).collect();
    assert_eq!(values, vec![dec!(400.00), dec!(250.00), dec!(250.00)]);
    assert_eq!(detail.installments[0].due_date, date(2024, 2, 5));
    assert_eq!(detail.installments[1].due_date, date(2024, 3, 6));
    assert_eq!(detail.installments[0].material_status, MaterialStatus::EmUso);
}

#[tokio::test]
async fn test_preview_not_matching_total_rejected() {
    let app = TestApp::new();
    let local = seed_location(&app.state, "Obra Centro").await;

    let mut preview = SchedulePreview::compute(ScheduleTerms {
        total_value: dec!(900.00),
        count: 3,
        days_to_first: 30,
        interval_days: 30,
        issue_date: date(2024, 1, 1),
    })
    .unwrap();
    preview.installments[2].value = dec!(299.00);

    let err = app
        .state
        .invoices
        .create(
            app.actor(),
            nota_form("56", "ACME", "900,00", local.id, 3),
            Some(preview.installments),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Consistency(_)));
    assert!(app
        .state
        .invoices
        .list(&InvoiceFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_failed_schedule_insert_removes_nota() {
    let base = Store::in_memory();
    let installments = FailingRepository::wrap(base.installments.clone());
    let store = Store {
        installments: installments.clone(),
        ..base
    };
    let app = TestApp::with_store(store);
    let local = seed_location(&app.state, "Obra Centro").await;

    installments.fail_inserts(true);
    let err = app
        .state
        .invoices
        .create(app.actor(), nota_form("77", "ACME", "300,00", local.id, 3), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Store(_)));
    assert!(app
        .state
        .store
        .invoices
        .select(&InvoiceFilter::default())
        .await
        .unwrap()
        .is_empty());

    // Nothing was half-written, so the same number can be registered later
    installments.fail_inserts(false);
    app.state
        .invoices
        .create(app.actor(), nota_form("77", "ACME", "300,00", local.id, 3), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_nota_removes_installments_and_audits() {
    let app = TestApp::new();
    let local = seed_location(&app.state, "Obra Centro").await;
    let created = app
        .state
        .invoices
        .create(app.actor(), nota_form("88", "ACME", "600,00", local.id, 2), None)
        .await
        .unwrap()
        .value;
    let id = created.invoice.id;

    let outcome = app.state.invoices.delete(app.actor(), id).await.unwrap();
    assert!(outcome.is_clean());

    assert!(matches!(
        app.state.invoices.get(id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(app
        .state
        .installments
        .list_for_invoice(id)
        .await
        .unwrap()
        .is_empty());

    let logs = app
        .state
        .audit
        .list(&LogFilter {
            action: Some(AuditAction::Delete),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    let before = logs[0].before.as_ref().unwrap();
    assert_eq!(before["nota"]["invoice_number"], "88");
    assert_eq!(before["parcelas"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_single_payment_nota_due_on_issue_date() {
    let app = TestApp::new();
    let local = seed_location(&app.state, "Obra Centro").await;
    let mut form = single_payment_form("99", "ACME", "R$ 1.234,56", local.id, today());
    form.material_status = MaterialStatus::EmUso;

    let detail = app
        .state
        .invoices
        .create(app.actor(), form, None)
        .await
        .unwrap()
        .value;

    assert!(!detail.invoice.is_installment);
    assert_eq!(detail.installments.len(), 1);
    let only = &detail.installments[0];
    assert_eq!(only.value, dec!(1234.56));
    assert_eq!(only.due_date, today());
    assert_eq!(only.status, InstallmentStatus::Pendente);
    assert_eq!(only.material_status, MaterialStatus::EmUso);
}

#[tokio::test]
async fn test_overdue_statuses_written_back_on_read() {
    let app = TestApp::new();
    let local = seed_location(&app.state, "Obra Centro").await;
    let created = app
        .state
        .invoices
        .create(app.actor(), nota_form("101", "ACME", "1.500,00", local.id, 3), None)
        .await
        .unwrap()
        .value;
    assert!(created
        .installments
        .iter()
        .all(|i| i.status == InstallmentStatus::Pendente));

    let detail = app.state.invoices.detail(created.invoice.id).await.unwrap();
    let statuses: Vec<_> = detail.installments.iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        vec![
            InstallmentStatus::Vencida,
            InstallmentStatus::Vencida,
            InstallmentStatus::Pendente,
        ]
    );

    let stored = app
        .state
        .store
        .installments
        .find_by_id(detail.installments[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InstallmentStatus::Vencida);
    let total: Decimal = detail.installments.iter().map(|i| i.value).sum();
    assert_eq!(total, dec!(1500.00));
}

#[tokio::test]
async fn test_update_location_and_material_status() {
    let app = TestApp::new();
    let centro = seed_location(&app.state, "Obra Centro").await;
    let norte = seed_location(&app.state, "Obra Norte").await;
    let id = app
        .state
        .invoices
        .create(app.actor(), nota_form("120", "ACME", "100,00", centro.id, 1), None)
        .await
        .unwrap()
        .value
        .invoice
        .id;

    let err = app
        .state
        .invoices
        .update_location(app.actor(), id, 999)
        .await
        .unwrap_err();
    assert!(err.violations().unwrap().contains("Local de aplicação não encontrado"));

    let moved = app
        .state
        .invoices
        .update_location(app.actor(), id, norte.id)
        .await
        .unwrap()
        .value;
    assert_eq!(moved.location_id, norte.id);

    let in_use = app
        .state
        .invoices
        .update_material_status(Actor::system(), id, MaterialStatus::EmUso)
        .await
        .unwrap()
        .value;
    assert_eq!(in_use.material_status, MaterialStatus::EmUso);

    let by_location = app
        .state
        .invoices
        .list(&InvoiceFilter {
            location_id: Some(norte.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_location.len(), 1);
}

#[tokio::test]
async fn test_audit_failure_does_not_block_registration() {
    let base = Store::in_memory();
    let logs = FailingRepository::wrap(base.logs.clone());
    let store = Store {
        logs: logs.clone(),
        ..base
    };
    let app = TestApp::with_store(store);
    let local = seed_location(&app.state, "Obra Centro").await;

    logs.fail_inserts(true);
    let outcome = app
        .state
        .invoices
        .create(app.actor(), nota_form("130", "ACME", "300,00", local.id, 3), None)
        .await
        .unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].table, "notas");
    assert!(app.state.invoices.get(outcome.value.invoice.id).await.is_ok());
}
