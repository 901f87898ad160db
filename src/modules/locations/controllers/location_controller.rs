use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::Result;
use crate::modules::auth::models::Session;
use crate::modules::locations::services::LocationService;

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
}

pub async fn create_local(
    service: web::Data<Arc<LocationService>>,
    session: Session,
    request: web::Json<CreateLocationRequest>,
) -> Result<HttpResponse> {
    let outcome = service.create(session.actor(), &request.name).await?;

    Ok(HttpResponse::Created().json(outcome))
}

pub async fn list_locais(
    service: web::Data<Arc<LocationService>>,
    _session: Session,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.list().await?))
}

pub async fn delete_local(
    service: web::Data<Arc<LocationService>>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let outcome = service.delete(session.actor(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/locais")
            .route("", web::post().to(create_local))
            .route("", web::get().to(list_locais))
            .route("/{id}", web::delete().to(delete_local)),
    );
}
