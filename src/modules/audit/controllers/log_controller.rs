use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::Result;
use crate::modules::audit::models::LogFilter;
use crate::modules::audit::services::AuditLogger;
use crate::modules::auth::models::Session;
use crate::modules::auth::services::AuthService;

/// Audit records, newest first; administrators only
/// GET /api/logs?user_id=&action=&table=&limit=&offset=
pub async fn list_logs(
    audit: web::Data<Arc<AuditLogger>>,
    auth: web::Data<Arc<AuthService>>,
    session: Session,
    query: web::Query<LogFilter>,
) -> Result<HttpResponse> {
    auth.require_admin(&session)?;

    let entries = audit.list(&query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(entries))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/logs").route("", web::get().to(list_logs)));
}
