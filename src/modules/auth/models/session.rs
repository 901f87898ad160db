use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;
use crate::modules::audit::services::Actor;

/// Signed-in user context.
///
/// Created by a successful login and dropped on logout; handlers receive it
/// from the session middleware instead of reading ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub user_name: String,
    pub email: String,
    pub role: String,
    /// Provider access token, needed for provider sign-out
    #[serde(skip_serializing)]
    pub provider_token: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn open(
        token: String,
        user: &User,
        provider_token: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token,
            user_id: user.id,
            user_name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            provider_token,
            started_at,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Audit attribution for actions taken in this session
    pub fn actor(&self) -> Actor {
        Actor::user(self.user_id)
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub secret: String,
}

/// User as reported by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    pub email: Option<String>,
    /// Profile fields supplied at sign-up (nome, cpf, funcao, empresa)
    #[serde(default, alias = "user_metadata")]
    pub metadata: serde_json::Value,
}

impl ProviderUser {
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        self.metadata
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Result of a successful provider sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: Option<String>,
    pub user: ProviderUser,
}
