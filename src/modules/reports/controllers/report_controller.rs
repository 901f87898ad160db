use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::Result;
use crate::modules::auth::models::Session;
use crate::modules::reports::services::ReportService;

/// Query parameters for the monthly report
#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

/// GET /api/reports/monthly?year=2024&month=3
pub async fn monthly_report(
    service: web::Data<Arc<ReportService>>,
    _session: Session,
    query: web::Query<MonthlyReportQuery>,
) -> Result<HttpResponse> {
    let report = service.monthly_report(query.year, query.month).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// GET /api/reports/dashboard
pub async fn dashboard(
    service: web::Data<Arc<ReportService>>,
    _session: Session,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.dashboard().await?))
}

/// GET /api/reports/summary
pub async fn summary(
    service: web::Data<Arc<ReportService>>,
    _session: Session,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.summary().await?))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/monthly", web::get().to(monthly_report))
            .route("/dashboard", web::get().to(dashboard))
            .route("/summary", web::get().to(summary)),
    );
}
