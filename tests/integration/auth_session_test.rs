//! Login, registration and session lifecycle against a fake identity provider

#[path = "../helpers/mod.rs"]
mod helpers;

use contas_obra::core::{AppError, Repository};
use contas_obra::modules::audit::models::{AuditAction, LogFilter};
use contas_obra::modules::auth::models::{Credentials, UserFilter, UserPatch, DEFAULT_ROLE};
use contas_obra::Store;
use helpers::*;
use serde_json::json;
use std::sync::atomic::Ordering;

fn credentials(email: &str, secret: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        secret: secret.to_string(),
    }
}

#[tokio::test]
async fn test_register_opens_session() {
    let app = TestApp::new();

    let outcome = app
        .state
        .auth
        .register(registration_form("Joana@Obra.com", "123.456.789-00", "Engenheira"))
        .await
        .unwrap();
    assert!(outcome.is_clean());

    let session = outcome.value;
    assert_eq!(session.email, "joana@obra.com");
    assert_eq!(session.role, "Engenheira");
    assert_eq!(session.token.len(), 64);
    assert_eq!(app.state.auth.current_session(&session.token).unwrap(), session);
    assert_eq!(app.provider.account_count(), 1);

    let users = app.state.store.users.select(&UserFilter::default()).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].cpf.as_deref(), Some("12345678900"));

    let actions: Vec<_> = app
        .state
        .audit
        .list(&LogFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.action)
        .collect();
    assert!(actions.contains(&AuditAction::Register));
    assert!(actions.contains(&AuditAction::Login));
}

#[tokio::test]
async fn test_wrong_access_code_rejected_before_provider() {
    let app = TestApp::new();
    let mut form = registration_form("joana@obra.com", "123.456.789-00", "Engenheira");
    form.access_code = Some("chute".to_string());

    let err = app.state.auth.register(form).await.unwrap_err();

    assert!(err.violations().unwrap().contains("Código de acesso inválido"));
    assert_eq!(app.provider.account_count(), 0);
    assert!(app.state.sessions.is_empty());
}

#[tokio::test]
async fn test_duplicate_email_and_cpf_reported_together() {
    let app = TestApp::new();
    app.sign_up("joana@obra.com", "123.456.789-00", DEFAULT_ROLE).await;

    let err = app
        .state
        .auth
        .register(registration_form("JOANA@obra.com", "12345678900", DEFAULT_ROLE))
        .await
        .unwrap_err();

    let violations = err.violations().unwrap();
    assert_eq!(violations.len(), 2);
    assert!(violations.contains("Já existe um usuário com este email"));
    assert!(violations.contains("Já existe um usuário com este CPF"));
}

#[tokio::test]
async fn test_first_login_creates_profile_from_provider() {
    let provider = FakeIdentityProvider::new().with_account(
        "pedro@obra.com",
        "segredo",
        json!({"nome": "Pedro Alves", "funcao": ADMIN_ROLE}),
    );
    let app = TestApp::with_parts(Store::in_memory(), provider);

    let session = app
        .state
        .auth
        .authenticate(credentials("  Pedro@Obra.com ", "segredo"))
        .await
        .unwrap()
        .value;

    assert_eq!(session.user_name, "Pedro Alves");
    assert!(app.state.auth.require_admin(&session).is_ok());

    let creates = app
        .state
        .audit
        .list(&LogFilter {
            action: Some(AuditAction::Create),
            table: Some("usuarios".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].record_id, Some(session.user_id));

    // Second login reuses the profile
    app.state
        .auth
        .authenticate(credentials("pedro@obra.com", "segredo"))
        .await
        .unwrap();
    assert_eq!(
        app.state.store.users.select(&UserFilter::default()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_bad_credentials() {
    let app = TestApp::new();
    app.sign_up("joana@obra.com", "123.456.789-00", DEFAULT_ROLE).await;

    let wrong = app
        .state
        .auth
        .authenticate(credentials("joana@obra.com", "errada"))
        .await
        .unwrap_err();
    assert!(matches!(wrong, AppError::Unauthorized(_)));

    let empty = app
        .state
        .auth
        .authenticate(credentials("", ""))
        .await
        .unwrap_err();
    assert!(empty.violations().unwrap().contains("Email e senha são obrigatórios"));
}

#[tokio::test]
async fn test_inactive_profile_cannot_sign_in() {
    let app = TestApp::new();
    let session = app.sign_up("joana@obra.com", "123.456.789-00", DEFAULT_ROLE).await;
    app.state
        .store
        .users
        .update(
            session.user_id,
            UserPatch {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = app
        .state
        .auth
        .authenticate(credentials("joana@obra.com", "senha-forte"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_logout_closes_session() {
    let app = TestApp::new();
    let session = app.sign_up("joana@obra.com", "123.456.789-00", DEFAULT_ROLE).await;

    app.state.auth.end_session(&session.token).await.unwrap();

    assert_eq!(app.provider.sign_out_count(), 1);
    assert!(matches!(
        app.state.auth.current_session(&session.token),
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        app.state.auth.end_session(&session.token).await,
        Err(AppError::Unauthorized(_))
    ));

    let logouts = app
        .state
        .audit
        .list(&LogFilter {
            action: Some(AuditAction::Logout),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(logouts.len(), 1);
    assert_eq!(logouts[0].user_id, Some(session.user_id));
}

#[tokio::test]
async fn test_provider_sign_out_failure_still_logs_out() {
    let app = TestApp::new();
    let session = app.sign_up("joana@obra.com", "123.456.789-00", DEFAULT_ROLE).await;
    app.provider.fail_sign_out.store(true, Ordering::SeqCst);

    app.state.auth.end_session(&session.token).await.unwrap();

    assert!(app.state.auth.current_session(&session.token).is_err());
}

#[tokio::test]
async fn test_admin_gate() {
    let app = TestApp::new();
    let user = app.sign_up("joana@obra.com", "123.456.789-00", DEFAULT_ROLE).await;
    let admin = app.admin().await;

    assert!(matches!(
        app.state.auth.require_admin(&user),
        Err(AppError::Forbidden(_))
    ));
    assert!(app.state.auth.require_admin(&admin).is_ok());
    assert_eq!(app.state.sessions.len(), 2);
}

#[tokio::test]
async fn test_audit_failure_surfaces_as_warning() {
    let base = Store::in_memory();
    let logs = FailingRepository::wrap(base.logs.clone());
    let store = Store {
        logs: logs.clone(),
        ..base
    };
    let app = TestApp::with_store(store);
    app.sign_up("joana@obra.com", "123.456.789-00", DEFAULT_ROLE).await;

    logs.fail_inserts(true);
    let outcome = app
        .state
        .auth
        .authenticate(credentials("joana@obra.com", "senha-forte"))
        .await
        .unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].action, "LOGIN");
    assert!(app.state.auth.current_session(&outcome.value.token).is_ok());
}
