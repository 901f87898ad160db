use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::Result;
use crate::modules::auth::models::Session;
use crate::modules::suppliers::models::{SupplierFilter, SupplierForm};
use crate::modules::suppliers::services::SupplierService;

/// POST /api/fornecedores
pub async fn create_fornecedor(
    service: web::Data<Arc<SupplierService>>,
    session: Session,
    form: web::Json<SupplierForm>,
) -> Result<HttpResponse> {
    let outcome = service.create(session.actor(), form.into_inner()).await?;

    Ok(HttpResponse::Created().json(outcome))
}

/// GET /api/fornecedores?name=&cnpj=&salesperson=
pub async fn list_fornecedores(
    service: web::Data<Arc<SupplierService>>,
    _session: Session,
    query: web::Query<SupplierFilter>,
) -> Result<HttpResponse> {
    let suppliers = service.list(&query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(suppliers))
}

pub async fn get_fornecedor(
    service: web::Data<Arc<SupplierService>>,
    _session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let supplier = service.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(supplier))
}

pub async fn update_fornecedor(
    service: web::Data<Arc<SupplierService>>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<SupplierForm>,
) -> Result<HttpResponse> {
    let outcome = service
        .update(session.actor(), path.into_inner(), form.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn delete_fornecedor(
    service: web::Data<Arc<SupplierService>>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let outcome = service.delete(session.actor(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/fornecedores")
            .route("", web::post().to(create_fornecedor))
            .route("", web::get().to(list_fornecedores))
            .route("/{id}", web::get().to(get_fornecedor))
            .route("/{id}", web::put().to(update_fornecedor))
            .route("/{id}", web::delete().to(delete_fornecedor)),
    );
}
