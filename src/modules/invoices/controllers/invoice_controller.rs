use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::auth::models::Session;
use crate::modules::installments::models::InstallmentDraft;
use crate::modules::invoices::models::{InvoiceFilter, InvoiceForm, MaterialStatus};
use crate::modules::invoices::services::InvoiceService;

/// Body of `POST /api/notas`
#[derive(Debug, Deserialize)]
pub struct CreateNotaRequest {
    pub nota: InvoiceForm,
    /// Previewed (possibly edited) schedule to store instead of a fresh one
    #[serde(default)]
    pub parcelas: Option<Vec<InstallmentDraft>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    pub location_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMaterialStatusRequest {
    pub material_status: MaterialStatus,
}

/// Register an invoice with its installments
/// POST /api/notas
pub async fn create_nota(
    service: web::Data<Arc<InvoiceService>>,
    session: Session,
    request: web::Json<CreateNotaRequest>,
) -> Result<HttpResponse, AppError> {
    let CreateNotaRequest { nota, parcelas } = request.into_inner();
    let outcome = service.create(session.actor(), nota, parcelas).await?;

    Ok(HttpResponse::Created().json(outcome))
}

/// GET /api/notas
pub async fn list_notas(
    service: web::Data<Arc<InvoiceService>>,
    _session: Session,
    query: web::Query<InvoiceFilter>,
) -> Result<HttpResponse, AppError> {
    let notas = service.list(&query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(notas))
}

/// Invoice with installments, statuses refreshed
/// GET /api/notas/{id}
pub async fn get_nota(
    service: web::Data<Arc<InvoiceService>>,
    _session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let detail = service.detail(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// PATCH /api/notas/{id}/local
pub async fn update_local(
    service: web::Data<Arc<InvoiceService>>,
    session: Session,
    path: web::Path<i64>,
    request: web::Json<UpdateLocationRequest>,
) -> Result<HttpResponse, AppError> {
    let outcome = service
        .update_location(session.actor(), path.into_inner(), request.location_id)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// PATCH /api/notas/{id}/status-material
pub async fn update_status_material(
    service: web::Data<Arc<InvoiceService>>,
    session: Session,
    path: web::Path<i64>,
    request: web::Json<UpdateMaterialStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let outcome = service
        .update_material_status(session.actor(), path.into_inner(), request.material_status)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Delete an invoice and its installments
/// DELETE /api/notas/{id}
pub async fn delete_nota(
    service: web::Data<Arc<InvoiceService>>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let outcome = service.delete(session.actor(), path.into_inner()).await?;

    if outcome.is_clean() {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::Ok().json(outcome))
    }
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notas")
            .route("", web::post().to(create_nota))
            .route("", web::get().to(list_notas))
            .route("/{id}", web::get().to(get_nota))
            .route("/{id}", web::delete().to(delete_nota))
            .route("/{id}/local", web::patch().to(update_local))
            .route("/{id}/status-material", web::patch().to(update_status_material)),
    );
}
