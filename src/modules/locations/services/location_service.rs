use std::sync::Arc;
use tracing::info;

use crate::core::{AppError, BusinessClock, Outcome, Repository, Result};
use crate::modules::audit::models::AuditAction;
use crate::modules::audit::services::{Actor, AuditEvent, AuditLogger};
use crate::modules::invoices::models::{Invoice, InvoiceFilter};
use crate::modules::locations::models::{Location, LocationFilter, NewLocation};

/// Service for application locations (locais de aplicação)
#[derive(Clone)]
pub struct LocationService {
    locations: Arc<dyn Repository<Location>>,
    invoices: Arc<dyn Repository<Invoice>>,
    audit: AuditLogger,
    clock: BusinessClock,
}

impl LocationService {
    pub fn new(
        locations: Arc<dyn Repository<Location>>,
        invoices: Arc<dyn Repository<Invoice>>,
        audit: AuditLogger,
        clock: BusinessClock,
    ) -> Self {
        Self {
            locations,
            invoices,
            audit,
            clock,
        }
    }

    pub async fn create(&self, actor: Actor, name: &str) -> Result<Outcome<Location>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Nome do local é obrigatório"));
        }

        let existing = self
            .locations
            .select(&LocationFilter {
                name: Some(name.to_string()),
            })
            .await?;
        if !existing.is_empty() {
            return Err(AppError::validation(format!(
                "Já existe um local com o nome: {}",
                name
            )));
        }

        let location = self
            .locations
            .insert(NewLocation {
                name: name.to_string(),
                created_at: self.clock.now(),
            })
            .await?;

        info!(local_id = location.id, nome = location.name.as_str(), "Location created");

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Create, "locais_aplicacao", Some(location.id))
                    .after(&location),
            )
            .await;

        Ok(Outcome::new(location).with_warning(warning))
    }

    /// Every location ordered by name
    pub async fn list(&self) -> Result<Vec<Location>> {
        self.locations.select(&LocationFilter::default()).await
    }

    /// Locations still referenced by an invoice cannot be removed
    pub async fn delete(&self, actor: Actor, id: i64) -> Result<Outcome<()>> {
        let location = self
            .locations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Local {} não encontrado", id)))?;

        let in_use = self
            .invoices
            .select(&InvoiceFilter {
                location_id: Some(id),
                ..Default::default()
            })
            .await?;
        if !in_use.is_empty() {
            return Err(AppError::validation(format!(
                "Local {} está vinculado a {} nota(s)",
                location.name,
                in_use.len()
            )));
        }

        self.locations.delete(id).await?;

        info!(local_id = id, "Location deleted");

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Delete, "locais_aplicacao", Some(id))
                    .before(&location),
            )
            .await;

        Ok(Outcome::new(()).with_warning(warning))
    }
}
