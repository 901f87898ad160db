// In-process identity provider

use async_trait::async_trait;
use contas_obra::core::{AppError, Result};
use contas_obra::modules::auth::models::{ProviderSession, ProviderUser};
use contas_obra::modules::auth::services::IdentityProvider;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone)]
struct Account {
    id: String,
    secret: String,
    metadata: Value,
}

/// Knows the accounts created through `sign_up` or `with_account`
#[derive(Default)]
pub struct FakeIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    sign_outs: AtomicUsize,
    pub fail_sign_out: AtomicBool,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-existing provider account without a local profile
    pub fn with_account(self, email: &str, secret: &str, metadata: Value) -> Self {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                id: format!("uid-{}", email),
                secret: secret.to_string(),
                metadata,
            },
        );
        self
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in(&self, email: &str, secret: &str) -> Result<ProviderSession> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some(account) if account.secret == secret => Ok(ProviderSession {
                access_token: Some(format!("access-{}", account.id)),
                user: ProviderUser {
                    id: account.id.clone(),
                    email: Some(email.to_string()),
                    metadata: account.metadata.clone(),
                },
            }),
            _ => Err(AppError::unauthorized("Email ou senha inválidos")),
        }
    }

    async fn sign_up(&self, email: &str, secret: &str, metadata: Value) -> Result<ProviderUser> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AppError::validation("User already registered"));
        }

        let account = Account {
            id: format!("uid-{}", email),
            secret: secret.to_string(),
            metadata: metadata.clone(),
        };
        accounts.insert(email.to_string(), account.clone());

        Ok(ProviderUser {
            id: account.id,
            email: Some(email.to_string()),
            metadata,
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AppError::auth("provider offline"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
