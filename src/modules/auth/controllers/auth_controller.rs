use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::Result;
use crate::modules::auth::models::{Credentials, RegistrationForm, Session};
use crate::modules::auth::services::AuthService;

/// POST /api/auth/login
pub async fn login(
    service: web::Data<Arc<AuthService>>,
    credentials: web::Json<Credentials>,
) -> Result<HttpResponse> {
    let outcome = service.authenticate(credentials.into_inner()).await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /api/auth/register
pub async fn register(
    service: web::Data<Arc<AuthService>>,
    form: web::Json<RegistrationForm>,
) -> Result<HttpResponse> {
    let outcome = service.register(form.into_inner()).await?;

    Ok(HttpResponse::Created().json(outcome))
}

/// GET /api/auth/session
pub async fn current_session(session: Session) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(session))
}

/// POST /api/auth/logout
pub async fn logout(
    service: web::Data<Arc<AuthService>>,
    session: Session,
) -> Result<HttpResponse> {
    let outcome = service.end_session(&session.token).await?;

    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/register", web::post().to(register))
            .route("/session", web::get().to(current_session))
            .route("/logout", web::post().to(logout)),
    );
}
