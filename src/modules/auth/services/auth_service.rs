// Auth gateway
//
// Credentials are checked by the external identity provider; this service
// keeps the local `usuarios` profile in step, opens and closes explicit
// sessions and writes LOGIN / REGISTER / LOGOUT audit records.

use std::sync::Arc;
use tracing::{info, warn};

use crate::core::{AppError, BusinessClock, Outcome, Repository, Result, Violations};
use crate::modules::audit::models::AuditAction;
use crate::modules::audit::services::{Actor, AuditEvent, AuditLogger};
use crate::modules::auth::models::{
    default_name, Credentials, NewUser, ProviderUser, RegistrationForm, Session, User,
    UserFilter, DEFAULT_ROLE,
};

use super::access_code::AccessCodeVerifier;
use super::identity_provider::IdentityProvider;
use super::session_registry::SessionRegistry;

/// Service for login, registration and session lifecycle
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn Repository<User>>,
    provider: Arc<dyn IdentityProvider>,
    access_code: AccessCodeVerifier,
    sessions: SessionRegistry,
    audit: AuditLogger,
    clock: BusinessClock,
    admin_role: String,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn Repository<User>>,
        provider: Arc<dyn IdentityProvider>,
        access_code: AccessCodeVerifier,
        sessions: SessionRegistry,
        audit: AuditLogger,
        clock: BusinessClock,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            users,
            provider,
            access_code,
            sessions,
            audit,
            clock,
            admin_role: admin_role.into(),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Sign in with the provider and open a session.
    ///
    /// A missing local profile is created from the provider's metadata.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Outcome<Session>> {
        let email = credentials.email.trim().to_lowercase();
        if email.is_empty() || credentials.secret.is_empty() {
            return Err(AppError::validation("Email e senha são obrigatórios"));
        }

        let provider_session = self.provider.sign_in(&email, &credentials.secret).await?;
        let mut warnings = Vec::new();

        let user = match self.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let user = self
                    .users
                    .insert(profile_from_provider(&email, &provider_session.user, self.clock.now()))
                    .await?;
                info!(usuario_id = user.id, "Local profile created on first login");
                warnings.extend(
                    self.audit
                        .record(
                            Actor::user(user.id),
                            AuditEvent::new(AuditAction::Create, "usuarios", Some(user.id))
                                .after(&user),
                        )
                        .await,
                );
                user
            }
        };

        if !user.active {
            warn!(usuario_id = user.id, "Login refused for inactive profile");
            return Err(AppError::forbidden("Usuário inativo"));
        }

        let session = Session::open(
            SessionRegistry::new_token(),
            &user,
            provider_session.access_token,
            self.clock.now(),
        );
        self.sessions.insert(session.clone())?;

        info!(usuario_id = user.id, provider = self.provider.name(), "User signed in");

        warnings.extend(
            self.audit
                .record(
                    Actor::user(user.id),
                    AuditEvent::new(AuditAction::Login, "usuarios", Some(user.id)).after(
                        &serde_json::json!({
                            "email": user.email,
                            "started_at": session.started_at,
                        }),
                    ),
                )
                .await,
        );

        let mut outcome = Outcome::new(session);
        outcome.warnings = warnings;
        Ok(outcome)
    }

    /// Self-service registration gated by the access code, followed by login
    pub async fn register(&self, form: RegistrationForm) -> Result<Outcome<Session>> {
        let registration = form.validate().map_err(AppError::Validation)?;

        let mut violations = Violations::new();
        if !self.access_code.verify(&registration.access_code)? {
            violations.push("Código de acesso inválido");
        }
        if self.find_by_email(&registration.email).await?.is_some() {
            violations.push("Já existe um usuário com este email");
        }
        if !self
            .users
            .select(&UserFilter::by_cpf(registration.cpf.clone()))
            .await?
            .is_empty()
        {
            violations.push("Já existe um usuário com este CPF");
        }
        if !violations.is_empty() {
            warn!(violations = %violations, "Registration rejected");
            return Err(AppError::Validation(violations));
        }

        let metadata = serde_json::json!({
            "nome": registration.name,
            "cpf": registration.cpf,
            "funcao": registration.role,
            "empresa": registration.company,
        });
        let provider_user = self
            .provider
            .sign_up(&registration.email, &registration.secret, metadata)
            .await?;

        let user = self.users.insert(registration.profile(self.clock.now())).await?;

        info!(
            usuario_id = user.id,
            provider_id = provider_user.id.as_str(),
            "User registered"
        );

        let warning = self
            .audit
            .record(
                Actor::user(user.id),
                AuditEvent::new(AuditAction::Register, "usuarios", Some(user.id)).after(&user),
            )
            .await;

        let mut outcome = self
            .authenticate(Credentials {
                email: registration.email,
                secret: registration.secret,
            })
            .await?;
        outcome.warnings.extend(warning);
        Ok(outcome)
    }

    pub fn current_session(&self, token: &str) -> Result<Session> {
        self.sessions
            .get(token)?
            .ok_or_else(|| AppError::unauthorized("Sessão inválida ou expirada"))
    }

    /// Close a session; provider sign-out is best-effort
    pub async fn end_session(&self, token: &str) -> Result<Outcome<()>> {
        let session = self
            .sessions
            .remove(token)?
            .ok_or_else(|| AppError::unauthorized("Sessão inválida ou expirada"))?;

        if let Some(provider_token) = &session.provider_token {
            if let Err(e) = self.provider.sign_out(provider_token).await {
                warn!(usuario_id = session.user_id, error = %e, "Provider sign-out failed");
            }
        }

        info!(usuario_id = session.user_id, "User signed out");

        let warning = self
            .audit
            .record(
                Actor::user(session.user_id),
                AuditEvent::new(AuditAction::Logout, "usuarios", Some(session.user_id)).before(
                    &serde_json::json!({
                        "email": session.email,
                        "started_at": session.started_at,
                    }),
                ),
            )
            .await;

        Ok(Outcome::new(()).with_warning(warning))
    }

    pub fn require_admin(&self, session: &Session) -> Result<()> {
        if session.has_role(&self.admin_role) {
            Ok(())
        } else {
            Err(AppError::forbidden("Acesso restrito a administradores"))
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .select(&UserFilter::by_email(email))
            .await?
            .into_iter()
            .next())
    }
}

fn profile_from_provider(
    email: &str,
    provider_user: &ProviderUser,
    created_at: chrono::DateTime<chrono::Utc>,
) -> NewUser {
    NewUser {
        name: provider_user
            .metadata_str("nome")
            .unwrap_or_else(|| default_name(email)),
        email: email.to_string(),
        cpf: provider_user.metadata_str("cpf"),
        role: provider_user
            .metadata_str("funcao")
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        company: provider_user.metadata_str("empresa"),
        active: true,
        created_at,
    }
}
