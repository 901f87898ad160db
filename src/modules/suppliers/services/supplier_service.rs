use std::sync::Arc;
use tracing::{info, warn};

use crate::core::{AppError, BusinessClock, Outcome, Repository, Result};
use crate::modules::audit::models::AuditAction;
use crate::modules::audit::services::{Actor, AuditEvent, AuditLogger};
use crate::modules::suppliers::models::{Supplier, SupplierFilter, SupplierForm};

/// Service for supplier (fornecedor) registration
#[derive(Clone)]
pub struct SupplierService {
    suppliers: Arc<dyn Repository<Supplier>>,
    audit: AuditLogger,
    clock: BusinessClock,
}

impl SupplierService {
    pub fn new(
        suppliers: Arc<dyn Repository<Supplier>>,
        audit: AuditLogger,
        clock: BusinessClock,
    ) -> Self {
        Self {
            suppliers,
            audit,
            clock,
        }
    }

    /// Register a supplier; field violations and a taken CNPJ are reported together
    pub async fn create(&self, actor: Actor, form: SupplierForm) -> Result<Outcome<Supplier>> {
        let (validated, mut violations) = match form.validate() {
            Ok(validated) => (Some(validated), Default::default()),
            Err(violations) => (None, violations),
        };

        if let Some(validated) = &validated {
            if self.cnpj_owner(&validated.cnpj).await?.is_some() {
                violations.push(duplicate_cnpj(&validated.cnpj));
            }
        }

        if !violations.is_empty() {
            warn!(violations = %violations, "Supplier registration rejected");
            return Err(AppError::Validation(violations));
        }
        let validated =
            validated.ok_or_else(|| AppError::internal("Validated supplier missing"))?;

        let supplier = self
            .suppliers
            .insert(validated.into_new(self.clock.now()))
            .await?;

        info!(
            fornecedor_id = supplier.id,
            cnpj = supplier.cnpj.as_str(),
            "Supplier registered"
        );

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Create, "fornecedores", Some(supplier.id))
                    .after(&supplier),
            )
            .await;

        Ok(Outcome::new(supplier).with_warning(warning))
    }

    pub async fn list(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>> {
        self.suppliers.select(filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Supplier> {
        self.suppliers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Fornecedor {} não encontrado", id)))
    }

    /// Replace every field; the CNPJ may only collide with the supplier itself
    pub async fn update(
        &self,
        actor: Actor,
        id: i64,
        form: SupplierForm,
    ) -> Result<Outcome<Supplier>> {
        let before = self.get(id).await?;
        let validated = form.validate().map_err(AppError::Validation)?;

        if let Some(owner) = self.cnpj_owner(&validated.cnpj).await? {
            if owner.id != id {
                return Err(AppError::validation(duplicate_cnpj(&validated.cnpj)));
            }
        }

        let updated = self.suppliers.update(id, validated.into_patch()).await?;

        info!(fornecedor_id = id, "Supplier updated");

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "fornecedores", Some(id))
                    .before(&before)
                    .after(&updated),
            )
            .await;

        Ok(Outcome::new(updated).with_warning(warning))
    }

    pub async fn delete(&self, actor: Actor, id: i64) -> Result<Outcome<()>> {
        let before = self.get(id).await?;
        self.suppliers.delete(id).await?;

        info!(fornecedor_id = id, "Supplier deleted");

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Delete, "fornecedores", Some(id)).before(&before),
            )
            .await;

        Ok(Outcome::new(()).with_warning(warning))
    }

    async fn cnpj_owner(&self, cnpj: &str) -> Result<Option<Supplier>> {
        Ok(self
            .suppliers
            .select(&SupplierFilter::by_cnpj(cnpj))
            .await?
            .into_iter()
            .next())
    }
}

fn duplicate_cnpj(cnpj: &str) -> String {
    format!("Já existe um fornecedor cadastrado com o CNPJ: {}", cnpj)
}
