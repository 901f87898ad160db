use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{AppError, BusinessClock, Outcome, Repository, Result, Violations};
use crate::modules::audit::models::AuditAction;
use crate::modules::audit::services::{Actor, AuditEvent, AuditLogger};
use crate::modules::installments::models::{Installment, InstallmentDraft, ScheduleTerms};
use crate::modules::installments::services::{
    InstallmentCalculator, InstallmentService, SchedulePreview,
};
use crate::modules::invoices::models::{
    Invoice, InvoiceFilter, InvoiceForm, InvoicePatch, MaterialStatus, NewInvoice,
};
use crate::modules::locations::models::Location;

/// Invoice together with its ordered installments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub installments: Vec<Installment>,
}

/// Service for invoice business logic
#[derive(Clone)]
pub struct InvoiceService {
    invoices: Arc<dyn Repository<Invoice>>,
    locations: Arc<dyn Repository<Location>>,
    installments: InstallmentService,
    audit: AuditLogger,
    clock: BusinessClock,
}

impl InvoiceService {
    pub fn new(
        invoices: Arc<dyn Repository<Invoice>>,
        locations: Arc<dyn Repository<Location>>,
        installments: InstallmentService,
        audit: AuditLogger,
        clock: BusinessClock,
    ) -> Self {
        Self {
            invoices,
            locations,
            installments,
            audit,
            clock,
        }
    }

    /// Register an invoice and its installments.
    ///
    /// Every field violation, a duplicate (number, supplier) pair and an
    /// unknown location are reported together. When `preview` is given it
    /// becomes the stored schedule after verification; otherwise the
    /// schedule is computed from the form. If the installments cannot be
    /// stored the invoice row is removed again.
    pub async fn create(
        &self,
        actor: Actor,
        form: InvoiceForm,
        preview: Option<Vec<InstallmentDraft>>,
    ) -> Result<Outcome<InvoiceDetail>> {
        let (validated, mut violations) = match form.validate(self.clock.today(), self.clock.now())
        {
            Ok(validated) => (Some(validated), Violations::new()),
            Err(violations) => (None, violations),
        };

        let number = form.invoice_number.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let supplier = form.supplier.as_deref().map(str::trim).filter(|s| !s.is_empty());
        if let (Some(number), Some(supplier)) = (number, supplier) {
            if self.is_duplicate(number, supplier).await? {
                violations.push("Já existe uma nota com este número para este fornecedor");
            }
        }

        if let Some(location_id) = form.location_id {
            if self.locations.find_by_id(location_id).await?.is_none() {
                violations.push("Local de aplicação não encontrado");
            }
        }

        if !violations.is_empty() {
            warn!(
                violations = %violations,
                "Invoice registration rejected"
            );
            return Err(AppError::Validation(violations));
        }
        let validated =
            validated.ok_or_else(|| AppError::internal("Validated invoice missing"))?;

        let drafts = Self::initial_schedule(&validated.invoice, validated.terms, preview)?;

        let invoice = self.invoices.insert(validated.invoice).await?;

        let installments = match self.installments.create_for_invoice(invoice.id, &drafts).await {
            Ok(installments) => installments,
            Err(e) => {
                warn!(
                    nota_id = invoice.id,
                    error = %e,
                    "Failed to store installments, removing invoice"
                );
                if let Err(cleanup) = self.invoices.delete(invoice.id).await {
                    warn!(
                        nota_id = invoice.id,
                        error = %cleanup,
                        "Failed to remove invoice without installments"
                    );
                }
                return Err(e);
            }
        };

        info!(
            nota_id = invoice.id,
            numero_nota = invoice.invoice_number.as_str(),
            fornecedor = invoice.supplier.as_str(),
            valor_total = %invoice.total_value,
            parcela_count = installments.len(),
            "Invoice registered"
        );

        let detail = InvoiceDetail {
            invoice,
            installments,
        };
        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Create, "notas", Some(detail.invoice.id))
                    .after(&detail),
            )
            .await;

        Ok(Outcome::new(detail).with_warning(warning))
    }

    pub async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        self.invoices.select(filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Invoice> {
        self.invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Nota {} não encontrada", id)))
    }

    /// Invoice with its installments, statuses refreshed
    pub async fn detail(&self, id: i64) -> Result<InvoiceDetail> {
        let invoice = self.get(id).await?;
        let installments = self.installments.list_for_invoice(id).await?;
        Ok(InvoiceDetail {
            invoice,
            installments,
        })
    }

    pub async fn update_location(
        &self,
        actor: Actor,
        id: i64,
        location_id: i64,
    ) -> Result<Outcome<Invoice>> {
        if self.locations.find_by_id(location_id).await?.is_none() {
            return Err(AppError::validation("Local de aplicação não encontrado"));
        }

        self.apply_patch(
            actor,
            id,
            InvoicePatch {
                location_id: Some(location_id),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn update_material_status(
        &self,
        actor: Actor,
        id: i64,
        material_status: MaterialStatus,
    ) -> Result<Outcome<Invoice>> {
        self.apply_patch(
            actor,
            id,
            InvoicePatch {
                material_status: Some(material_status),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete an invoice and all of its installments
    pub async fn delete(&self, actor: Actor, id: i64) -> Result<Outcome<()>> {
        let invoice = self.get(id).await?;
        let installments = self.installments.list_for_invoice(id).await?;

        let removed = self.installments.delete_for_invoice(id).await?;
        self.invoices.delete(id).await?;

        info!(nota_id = id, parcela_count = removed, "Invoice deleted");

        let snapshot = serde_json::json!({
            "nota": invoice,
            "parcelas": installments,
        });
        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Delete, "notas", Some(id)).before(&snapshot),
            )
            .await;

        Ok(Outcome::new(()).with_warning(warning))
    }

    /// Exact, case-sensitive match on (number, supplier)
    pub async fn is_duplicate(&self, invoice_number: &str, supplier: &str) -> Result<bool> {
        let existing = self
            .invoices
            .select(&InvoiceFilter {
                supplier: Some(supplier.to_string()),
                invoice_number: Some(invoice_number.to_string()),
                ..Default::default()
            })
            .await?;

        Ok(!existing.is_empty())
    }

    async fn apply_patch(&self, actor: Actor, id: i64, patch: InvoicePatch) -> Result<Outcome<Invoice>> {
        let before = self.get(id).await?;
        let updated = self.invoices.update(id, patch.clone()).await?;

        info!(
            nota_id = id,
            local_aplicacao = ?patch.location_id,
            status_material = ?patch.material_status,
            "Invoice updated"
        );

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "notas", Some(id))
                    .before(&before)
                    .after(&patch),
            )
            .await;

        Ok(Outcome::new(updated).with_warning(warning))
    }

    /// Schedule stored with a new invoice.
    ///
    /// Single-payment invoices get one installment for the full value, due
    /// on the issue date and carrying the invoice's material status.
    fn initial_schedule(
        invoice: &NewInvoice,
        terms: ScheduleTerms,
        preview: Option<Vec<InstallmentDraft>>,
    ) -> Result<Vec<InstallmentDraft>> {
        if !invoice.is_installment {
            let mut drafts =
                InstallmentCalculator::single_payment(invoice.total_value, invoice.issue_date)?;
            for draft in drafts.iter_mut() {
                draft.material_status = invoice.material_status;
            }
            return Ok(drafts);
        }

        match preview {
            Some(installments) => {
                let preview = SchedulePreview {
                    terms,
                    installments,
                };
                preview.verify()?;
                Ok(preview.into_installments())
            }
            None => InstallmentCalculator::schedule(&terms),
        }
    }
}
