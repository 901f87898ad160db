// Installment (parcela) endpoints
//
// Persisted schedules:
// - GET   /parcelas?nota_id={id}                   - installments of an invoice
// - POST  /parcelas/{id}/pagamento                 - mark as paid
// - PATCH /parcelas/{id}/status-material           - material status
// - PUT   /parcelas/nota/{nota_id}/{numero}        - edit one, reconcile the rest
// - POST  /parcelas/nota/{nota_id}/recalcular      - recompute the whole schedule

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::Result;
use crate::modules::auth::models::Session;
use crate::modules::installments::services::{InstallmentChange, InstallmentService};
use crate::modules::invoices::models::MaterialStatus;

#[derive(Debug, Deserialize)]
pub struct ListInstallmentsQuery {
    pub nota_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentRequest {
    /// Defaults to today
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MaterialStatusRequest {
    pub material_status: MaterialStatus,
}

pub async fn list_parcelas(
    service: web::Data<Arc<InstallmentService>>,
    _session: Session,
    query: web::Query<ListInstallmentsQuery>,
) -> Result<HttpResponse> {
    let installments = service.list_for_invoice(query.nota_id).await?;

    Ok(HttpResponse::Ok().json(installments))
}

pub async fn pay_parcela(
    service: web::Data<Arc<InstallmentService>>,
    session: Session,
    path: web::Path<i64>,
    request: Option<web::Json<PaymentRequest>>,
) -> Result<HttpResponse> {
    let payment_date = request.and_then(|r| r.into_inner().payment_date);
    let outcome = service
        .mark_paid(session.actor(), path.into_inner(), payment_date)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn update_status_material(
    service: web::Data<Arc<InstallmentService>>,
    session: Session,
    path: web::Path<i64>,
    request: web::Json<MaterialStatusRequest>,
) -> Result<HttpResponse> {
    let outcome = service
        .set_material_status(session.actor(), path.into_inner(), request.material_status)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn edit_parcela(
    service: web::Data<Arc<InstallmentService>>,
    session: Session,
    path: web::Path<(i64, u32)>,
    request: web::Json<InstallmentChange>,
) -> Result<HttpResponse> {
    let (nota_id, numero) = path.into_inner();
    let outcome = service
        .edit_installment(session.actor(), nota_id, numero, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn recalculate_parcelas(
    service: web::Data<Arc<InstallmentService>>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let outcome = service
        .recalculate_all(session.actor(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/parcelas")
            .route("", web::get().to(list_parcelas))
            .route("/{id}/pagamento", web::post().to(pay_parcela))
            .route("/{id}/status-material", web::patch().to(update_status_material))
            .route("/nota/{nota_id}/recalcular", web::post().to(recalculate_parcelas))
            .route("/nota/{nota_id}/{numero}", web::put().to(edit_parcela)),
    );
}
