//! Supplier (fornecedor) and application location (local) registration

#[path = "../helpers/mod.rs"]
mod helpers;

use contas_obra::core::AppError;
use contas_obra::modules::audit::models::{AuditAction, LogFilter};
use contas_obra::modules::audit::services::Actor;
use contas_obra::modules::suppliers::models::{SupplierFilter, SupplierForm};
use helpers::*;

fn supplier_form(name: &str, cnpj: &str, salesperson: Option<&str>) -> SupplierForm {
    SupplierForm {
        name: Some(name.to_string()),
        cnpj: Some(cnpj.to_string()),
        phone: Some("(11) 3333-4444".to_string()),
        salesperson: salesperson.map(str::to_string),
    }
}

#[tokio::test]
async fn test_register_supplier_masks_cnpj() {
    let app = TestApp::new();

    let supplier = app
        .state
        .suppliers
        .create(app.actor(), supplier_form("Cimentos Brasil", "12345678000190", Some("Rita")))
        .await
        .unwrap()
        .value;

    assert_eq!(supplier.cnpj, "12.345.678/0001-90");
    assert_eq!(supplier.salesperson.as_deref(), Some("Rita"));
    assert_eq!(app.state.suppliers.get(supplier.id).await.unwrap(), supplier);
}

#[tokio::test]
async fn test_incomplete_cnpj_rejected() {
    let app = TestApp::new();

    let err = app
        .state
        .suppliers
        .create(app.actor(), supplier_form("Areia Fina", "1234", None))
        .await
        .unwrap_err();

    assert!(err.violations().unwrap().contains("CNPJ deve ter 14 dígitos"));
}

#[tokio::test]
async fn test_missing_fields_reported_together() {
    let app = TestApp::new();

    let err = app
        .state
        .suppliers
        .create(app.actor(), SupplierForm::default())
        .await
        .unwrap_err();

    let violations = err.violations().unwrap();
    assert_eq!(violations.len(), 3);
    assert!(violations.contains("Nome do fornecedor é obrigatório"));
    assert!(violations.contains("CNPJ é obrigatório"));
    assert!(violations.contains("Telefone é obrigatório"));
}

#[tokio::test]
async fn test_duplicate_cnpj_rejected_in_any_notation() {
    let app = TestApp::new();
    let suppliers = &app.state.suppliers;

    suppliers
        .create(app.actor(), supplier_form("Cimentos Brasil", "12.345.678/0001-90", None))
        .await
        .unwrap();

    let err = suppliers
        .create(app.actor(), supplier_form("Outro Nome", "12345678000190", None))
        .await
        .unwrap_err();

    assert!(err
        .violations()
        .unwrap()
        .contains("Já existe um fornecedor cadastrado com o CNPJ: 12.345.678/0001-90"));
}

#[tokio::test]
async fn test_update_keeps_own_cnpj_but_not_anothers() {
    let app = TestApp::new();
    let suppliers = &app.state.suppliers;
    let first = suppliers
        .create(app.actor(), supplier_form("Cimentos Brasil", "12345678000190", Some("Rita")))
        .await
        .unwrap()
        .value;
    let second = suppliers
        .create(app.actor(), supplier_form("Tijolos Norte", "98765432000110", None))
        .await
        .unwrap()
        .value;

    let renamed = suppliers
        .update(app.actor(), first.id, supplier_form("Cimentos do Brasil", "12345678000190", None))
        .await
        .unwrap()
        .value;
    assert_eq!(renamed.name, "Cimentos do Brasil");
    assert_eq!(renamed.salesperson, None);

    let err = suppliers
        .update(app.actor(), second.id, supplier_form("Tijolos Norte", "12345678000190", None))
        .await
        .unwrap_err();
    assert!(err.violations().unwrap().contains("Já existe um fornecedor"));
}

#[tokio::test]
async fn test_list_filters_and_delete() {
    let app = TestApp::new();
    let suppliers = &app.state.suppliers;
    suppliers
        .create(app.actor(), supplier_form("Cimentos Brasil", "12345678000190", Some("Rita Souza")))
        .await
        .unwrap();
    let tijolos = suppliers
        .create(app.actor(), supplier_form("Tijolos Norte", "98765432000110", Some("Paulo")))
        .await
        .unwrap()
        .value;

    let by_name = suppliers
        .list(&SupplierFilter {
            name: Some("cimentos".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);

    let by_salesperson = suppliers
        .list(&SupplierFilter {
            salesperson: Some("paulo".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_salesperson[0].id, tijolos.id);

    suppliers.delete(app.actor(), tijolos.id).await.unwrap();
    assert!(matches!(
        suppliers.get(tijolos.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(suppliers.list(&SupplierFilter::default()).await.unwrap().len(), 1);

    let deletes = app
        .state
        .audit
        .list(&LogFilter {
            action: Some(AuditAction::Delete),
            table: Some("fornecedores".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(deletes.len(), 1);
}

#[tokio::test]
async fn test_location_names_are_unique() {
    let app = TestApp::new();
    let locations = &app.state.locations;

    seed_location(&app.state, "Obra Centro").await;

    let duplicate = locations
        .create(Actor::system(), "  Obra Centro ")
        .await
        .unwrap_err();
    assert!(duplicate
        .violations()
        .unwrap()
        .contains("Já existe um local com o nome: Obra Centro"));

    let blank = locations.create(Actor::system(), "   ").await.unwrap_err();
    assert!(blank.violations().unwrap().contains("Nome do local é obrigatório"));
}

#[tokio::test]
async fn test_locations_listed_by_name() {
    let app = TestApp::new();
    seed_location(&app.state, "Obra Sul").await;
    seed_location(&app.state, "Almoxarifado").await;

    let names: Vec<_> = app
        .state
        .locations
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();

    assert_eq!(names, vec!["Almoxarifado", "Obra Sul"]);
}

#[tokio::test]
async fn test_location_in_use_cannot_be_deleted() {
    let app = TestApp::new();
    let used = seed_location(&app.state, "Obra Centro").await;
    let free = seed_location(&app.state, "Obra Norte").await;
    app.state
        .invoices
        .create(app.actor(), nota_form("1", "ACME", "100,00", used.id, 1), None)
        .await
        .unwrap();

    let err = app
        .state
        .locations
        .delete(app.actor(), used.id)
        .await
        .unwrap_err();
    assert!(err
        .violations()
        .unwrap()
        .contains("Local Obra Centro está vinculado a 1 nota(s)"));

    app.state.locations.delete(app.actor(), free.id).await.unwrap();
    assert_eq!(app.state.locations.list().await.unwrap().len(), 1);
}
