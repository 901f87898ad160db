// Schedule previews
//
// Unsaved schedules live with the client between calls; every endpoint
// takes the current preview and returns the next one.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::Result;
use crate::modules::auth::models::Session;
use crate::modules::installments::models::{InstallmentEdit, ScheduleTerms};
use crate::modules::installments::services::SchedulePreview;

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub preview: SchedulePreview,
    pub edit: InstallmentEdit,
}

/// POST /previews
pub async fn preview(_session: Session, terms: web::Json<ScheduleTerms>) -> Result<HttpResponse> {
    let preview = SchedulePreview::compute(terms.into_inner())?;

    Ok(HttpResponse::Ok().json(preview))
}

/// POST /previews/reconcile
pub async fn preview_reconcile(
    _session: Session,
    request: web::Json<ReconcileRequest>,
) -> Result<HttpResponse> {
    let ReconcileRequest { mut preview, edit } = request.into_inner();
    preview.apply_edit(&edit)?;

    Ok(HttpResponse::Ok().json(preview))
}

/// POST /previews/recalculate
pub async fn preview_recalculate(
    _session: Session,
    preview: web::Json<SchedulePreview>,
) -> Result<HttpResponse> {
    let mut preview = preview.into_inner();
    preview.recalculate()?;

    Ok(HttpResponse::Ok().json(preview))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/previews")
            .route("", web::post().to(preview))
            .route("/reconcile", web::post().to(preview_reconcile))
            .route("/recalculate", web::post().to(preview_recalculate)),
    );
}
