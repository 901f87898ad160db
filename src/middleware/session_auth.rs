use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::core::AppError;
use crate::modules::auth::models::Session;
use crate::modules::auth::services::SessionRegistry;

/// Paths served without a session
const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/health",
    "/ready",
    "/api/auth/login",
    "/api/auth/register",
];

/// Bearer-token session middleware.
///
/// Resolves `Authorization: Bearer <token>` against the session registry and
/// stores the [`Session`] in the request extensions.
pub struct SessionAuth {
    sessions: SessionRegistry,
}

impl SessionAuth {
    pub fn new(sessions: SessionRegistry) -> Self {
        Self { sessions }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddleware {
            service: Rc::new(service),
            sessions: self.sessions.clone(),
        }))
    }
}

pub struct SessionAuthMiddleware<S> {
    service: Rc<S>,
    sessions: SessionRegistry,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let sessions = self.sessions.clone();

        Box::pin(async move {
            if PUBLIC_PATHS.contains(&req.path()) {
                return svc.call(req).await;
            }

            let token = bearer_token(req.request()).ok_or_else(|| {
                Error::from(AppError::unauthorized("Missing Authorization bearer token"))
            })?;

            let session = sessions
                .get(&token)
                .map_err(Error::from)?
                .ok_or_else(|| Error::from(AppError::unauthorized("Sessão inválida ou expirada")))?;

            req.extensions_mut().insert(session);

            svc.call(req).await
        })
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Handlers take the signed-in [`Session`] as an argument
impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Session>()
                .cloned()
                .ok_or_else(|| AppError::unauthorized("Sessão não encontrada")),
        )
    }
}
