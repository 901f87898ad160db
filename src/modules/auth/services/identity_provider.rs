use async_trait::async_trait;
use reqwest::{header, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{AppError, Result};
use crate::modules::auth::models::{ProviderSession, ProviderUser};

/// External identity provider the auth gateway delegates credentials to
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email and secret for a provider session
    async fn sign_in(&self, email: &str, secret: &str) -> Result<ProviderSession>;

    /// Create a provider account carrying the given profile metadata
    async fn sign_up(&self, email: &str, secret: &str, metadata: Value) -> Result<ProviderUser>;

    /// Revoke a provider access token
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    fn name(&self) -> &str;
}

/// Client for a GoTrue-compatible auth endpoint
pub struct GoTrueProvider {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl GoTrueProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, max_retries: u32) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .post(self.url(path))
            .header("apikey", &self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(body)?);

        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        request
            .send()
            .await
            .map_err(|e| AppError::auth(format!("Identity provider unreachable: {}", e)))
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: Value,
}

/// Sign-up answers with either a bare user or a full session
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: ProviderUser },
    User(ProviderUser),
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default, alias = "msg", alias = "error_description")]
    message: Option<String>,
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("{} {}", status, body))
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn sign_in(&self, email: &str, secret: &str) -> Result<ProviderSession> {
        let response = self
            .post(
                "token?grant_type=password",
                &PasswordGrant {
                    email,
                    password: secret,
                },
                None,
            )
            .await?;

        match response.status() {
            status if status.is_success() => response
                .json::<ProviderSession>()
                .await
                .map_err(|e| AppError::auth(format!("Invalid sign-in response: {}", e))),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(AppError::unauthorized("Email ou senha inválidos"))
            }
            _ => Err(AppError::auth(error_message(response).await)),
        }
    }

    async fn sign_up(&self, email: &str, secret: &str, metadata: Value) -> Result<ProviderUser> {
        let response = self
            .post(
                "signup",
                &SignUpRequest {
                    email,
                    password: secret,
                    data: metadata,
                },
                None,
            )
            .await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AppError::validation(error_message(response).await));
        }
        if !status.is_success() {
            return Err(AppError::auth(error_message(response).await));
        }

        match response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| AppError::auth(format!("Invalid sign-up response: {}", e)))?
        {
            SignUpResponse::Session { user } | SignUpResponse::User(user) => Ok(user),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .post("logout", &serde_json::json!({}), Some(access_token))
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::auth(error_message(response).await))
        }
    }

    fn name(&self) -> &str {
        "gotrue"
    }
}
