use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Record, Violations};

/// Role assigned to profiles created without an explicit one
pub const DEFAULT_ROLE: &str = "Usuário";

/// Local user profile (`usuarios`), mirrored from the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub cpf: Option<String>,
    /// Role (funcao); compared against the configured admin role
    pub role: String,
    pub company: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub cpf: Option<String>,
    pub role: String,
    pub company: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    pub email: Option<String>,
    pub cpf: Option<String>,
}

impl UserFilter {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn by_cpf(cpf: impl Into<String>) -> Self {
        Self {
            cpf: Some(cpf.into()),
            ..Default::default()
        }
    }
}

impl Record for User {
    type Draft = NewUser;
    type Patch = UserPatch;
    type Filter = UserFilter;

    const TABLE: &'static str = "usuarios";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Self-service registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub access_code: Option<String>,
    pub secret: Option<String>,
}

/// Registration fields after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub role: String,
    pub company: Option<String>,
    pub access_code: String,
    pub secret: String,
}

impl Registration {
    pub fn profile(&self, created_at: DateTime<Utc>) -> NewUser {
        NewUser {
            name: self.name.clone(),
            email: self.email.clone(),
            cpf: Some(self.cpf.clone()),
            role: self.role.clone(),
            company: self.company.clone(),
            active: true,
            created_at,
        }
    }
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Registration, Violations> {
        let mut violations = Violations::new();

        let name = present(&self.name);
        if name.is_none() {
            violations.push("Nome é obrigatório");
        }
        let cpf = present(&self.cpf).map(|c| c.chars().filter(char::is_ascii_digit).collect::<String>());
        if cpf.as_deref().map_or(true, str::is_empty) {
            violations.push("CPF é obrigatório");
        }
        let email = present(&self.email).map(|e| e.to_lowercase());
        match &email {
            None => violations.push("Email é obrigatório"),
            Some(e) if !e.contains('@') => violations.push("Email inválido"),
            Some(_) => {}
        }
        let access_code = present(&self.access_code);
        if access_code.is_none() {
            violations.push("Código de acesso é obrigatório");
        }
        let secret = self.secret.clone().filter(|s| !s.is_empty());
        if secret.is_none() {
            violations.push("Senha é obrigatória");
        }

        match (name, cpf, email, access_code, secret) {
            (Some(name), Some(cpf), Some(email), Some(access_code), Some(secret))
                if violations.is_empty() =>
            {
                Ok(Registration {
                    name,
                    cpf,
                    email,
                    role: present(&self.role).unwrap_or_else(|| DEFAULT_ROLE.to_string()),
                    company: present(&self.company),
                    access_code,
                    secret,
                })
            }
            _ => Err(violations),
        }
    }
}

/// Profile name derived from an email when the provider has none
pub fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
