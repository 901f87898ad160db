// Installment (parcela) business logic
//
// Persisted schedules are mutated only through this service: payments,
// material status toggles, single-installment edits (reconciled against the
// invoice total) and full recalculation. Listing lazily upgrades overdue
// installments and writes the new status back.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::{AppError, Outcome, Repository, Result};
use crate::modules::audit::models::AuditAction;
use crate::modules::audit::services::{Actor, AuditEvent, AuditLogger};
use crate::modules::installments::models::{
    Installment, InstallmentDraft, InstallmentEdit, InstallmentFilter, InstallmentPatch,
    InstallmentStatus, NewInstallment,
};
use crate::modules::invoices::models::{Invoice, MaterialStatus};

use super::installment_calculator::InstallmentCalculator;
use super::reconciler::InstallmentReconciler;
use super::status_resolver::{resolve_status, StatusResolver};

/// A requested change to one persisted installment
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InstallmentChange {
    pub value: rust_decimal::Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub material_status: Option<MaterialStatus>,
}

/// Service for installment business logic
#[derive(Clone)]
pub struct InstallmentService {
    installments: Arc<dyn Repository<Installment>>,
    invoices: Arc<dyn Repository<Invoice>>,
    audit: AuditLogger,
    resolver: StatusResolver,
}

impl InstallmentService {
    pub fn new(
        installments: Arc<dyn Repository<Installment>>,
        invoices: Arc<dyn Repository<Invoice>>,
        audit: AuditLogger,
        resolver: StatusResolver,
    ) -> Self {
        Self {
            installments,
            invoices,
            audit,
            resolver,
        }
    }

    /// Persist a freshly computed schedule for a new invoice
    pub async fn create_for_invoice(
        &self,
        invoice_id: i64,
        drafts: &[InstallmentDraft],
    ) -> Result<Vec<Installment>> {
        let rows = drafts
            .iter()
            .map(|draft| NewInstallment::from_draft(invoice_id, draft))
            .collect();

        let created = self.installments.insert_batch(rows).await?;

        info!(
            nota_id = invoice_id,
            parcela_count = created.len(),
            "Installments created"
        );

        Ok(created)
    }

    /// Installments of an invoice ordered by number, statuses refreshed.
    ///
    /// Installments whose effective status differs from the stored one are
    /// written back before returning; a failed write-back fails the call.
    pub async fn list_for_invoice(&self, invoice_id: i64) -> Result<Vec<Installment>> {
        self.list(&InstallmentFilter::for_invoice(invoice_id)).await
    }

    /// Installments matching the filter, statuses refreshed with write-back
    pub async fn list(&self, filter: &InstallmentFilter) -> Result<Vec<Installment>> {
        let mut installments = self.installments.select(filter).await?;

        for installment in installments.iter_mut() {
            if let Some(status) = self.resolver.pending_change(installment) {
                info!(
                    parcela_id = installment.id,
                    from = %installment.status,
                    to = %status,
                    "Installment status updated"
                );
                *installment = self
                    .installments
                    .update(installment.id, InstallmentPatch::status(status))
                    .await?;
            }
        }

        Ok(installments)
    }

    pub async fn get(&self, id: i64) -> Result<Installment> {
        self.installments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Parcela {} não encontrada", id)))
    }

    /// PENDENTE/VENCIDA → PAGA, stamping the payment date
    pub async fn mark_paid(
        &self,
        actor: Actor,
        id: i64,
        payment_date: Option<NaiveDate>,
    ) -> Result<Outcome<Installment>> {
        let before = self.get(id).await?;
        let payment_date = payment_date.unwrap_or_else(|| self.resolver.today());

        let mut paid = before.clone();
        paid.mark_as_paid(payment_date)?;

        let updated = self
            .installments
            .update(
                id,
                InstallmentPatch {
                    status: Some(InstallmentStatus::Paga),
                    payment_date: Some(payment_date),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            parcela_id = id,
            nota_id = updated.invoice_id,
            payment_date = %payment_date,
            "Installment marked as paid"
        );

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "parcelas", Some(id))
                    .before(&before)
                    .after(&updated),
            )
            .await;

        Ok(Outcome::new(updated).with_warning(warning))
    }

    pub async fn set_material_status(
        &self,
        actor: Actor,
        id: i64,
        material_status: MaterialStatus,
    ) -> Result<Outcome<Installment>> {
        let before = self.get(id).await?;

        let updated = self
            .installments
            .update(
                id,
                InstallmentPatch {
                    material_status: Some(material_status),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            parcela_id = id,
            status_material = %material_status,
            "Installment material status updated"
        );

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "parcelas", Some(id))
                    .before(&before)
                    .after(&updated),
            )
            .await;

        Ok(Outcome::new(updated).with_warning(warning))
    }

    /// Edit one installment by number and reconcile the rest of the schedule.
    ///
    /// The new schedule is computed in memory first; then every changed row
    /// is written. On a store failure the rows written so far are restored
    /// and the error is returned.
    pub async fn edit_installment(
        &self,
        actor: Actor,
        invoice_id: i64,
        number: u32,
        change: InstallmentChange,
    ) -> Result<Outcome<Vec<Installment>>> {
        let invoice = self.invoice(invoice_id).await?;
        let before = self.list_for_invoice(invoice_id).await?;

        let index = before
            .iter()
            .position(|i| i.number == number)
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Parcela {} da nota {} não encontrada",
                    number, invoice_id
                ))
            })?;

        let drafts: Vec<InstallmentDraft> = before.iter().map(Installment::to_draft).collect();
        let terms = invoice.schedule_terms().with_count(before.len() as u32);
        let edit = InstallmentEdit {
            index,
            value: change.value,
            due_date: change.due_date,
            material_status: change.material_status,
        };
        let reconciled = InstallmentReconciler::reconcile(&drafts, &edit, &terms)?;

        let after = self.persist_schedule(&before, &reconciled).await?;

        info!(
            nota_id = invoice_id,
            numero = number,
            valor = %change.value,
            "Installment edited and schedule reconciled"
        );

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "parcelas", Some(before[index].id))
                    .before(&before)
                    .after(&after),
            )
            .await;

        Ok(Outcome::new(after).with_warning(warning))
    }

    /// Re-derive every value and due date from the invoice terms
    pub async fn recalculate_all(
        &self,
        actor: Actor,
        invoice_id: i64,
    ) -> Result<Outcome<Vec<Installment>>> {
        let invoice = self.invoice(invoice_id).await?;
        let before = self.list_for_invoice(invoice_id).await?;

        let drafts: Vec<InstallmentDraft> = before.iter().map(Installment::to_draft).collect();
        let recomputed = if invoice.is_installment {
            InstallmentCalculator::recompute_all(&drafts, &invoice.schedule_terms())?
        } else {
            InstallmentCalculator::recompute_single_payment(
                &drafts,
                invoice.total_value,
                invoice.issue_date,
            )?
        };

        let after = self.persist_schedule(&before, &recomputed).await?;

        info!(
            nota_id = invoice_id,
            parcela_count = after.len(),
            "Installment schedule recalculated"
        );

        let warning = self
            .audit
            .record(
                actor,
                AuditEvent::new(AuditAction::Update, "parcelas", Some(invoice_id))
                    .before(&before)
                    .after(&after),
            )
            .await;

        Ok(Outcome::new(after).with_warning(warning))
    }

    /// Remove every installment of an invoice
    pub async fn delete_for_invoice(&self, invoice_id: i64) -> Result<u64> {
        self.installments
            .delete_where(&InstallmentFilter::for_invoice(invoice_id))
            .await
    }

    async fn invoice(&self, invoice_id: i64) -> Result<Invoice> {
        self.invoices
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Nota {} não encontrada", invoice_id)))
    }

    /// Write the rows whose value, due date or material status changed.
    ///
    /// A moved due date may change the effective status, which is written
    /// together with it. If a write fails, the rows already written are
    /// restored to their previous values before the error is returned.
    async fn persist_schedule(
        &self,
        before: &[Installment],
        after: &[InstallmentDraft],
    ) -> Result<Vec<Installment>> {
        let today = self.resolver.today();
        let mut saved: Vec<Installment> = Vec::with_capacity(after.len());

        for (old, new) in before.iter().zip(after) {
            let status = resolve_status(new.due_date, old.status, today);
            let patch = InstallmentPatch {
                value: (old.value != new.value).then_some(new.value),
                due_date: (old.due_date != new.due_date).then_some(new.due_date),
                status: (old.status != status).then_some(status),
                payment_date: None,
                material_status: (old.material_status != new.material_status)
                    .then_some(new.material_status),
            };

            if patch.is_empty() {
                saved.push(old.clone());
                continue;
            }

            match self.installments.update(old.id, patch).await {
                Ok(row) => saved.push(row),
                Err(e) => {
                    warn!(
                        parcela_id = old.id,
                        nota_id = old.invoice_id,
                        error = %e,
                        "Failed to store installment, restoring schedule"
                    );
                    self.restore(&before[..saved.len()], &saved).await;
                    return Err(e);
                }
            }
        }

        Ok(saved)
    }

    /// Best-effort rollback of rows written by an interrupted `persist_schedule`
    async fn restore(&self, original: &[Installment], written: &[Installment]) {
        for (old, current) in original.iter().zip(written) {
            let patch = InstallmentPatch {
                value: (old.value != current.value).then_some(old.value),
                due_date: (old.due_date != current.due_date).then_some(old.due_date),
                status: (old.status != current.status).then_some(old.status),
                payment_date: None,
                material_status: (old.material_status != current.material_status)
                    .then_some(old.material_status),
            };
            if patch.is_empty() {
                continue;
            }

            if let Err(e) = self.installments.update(old.id, patch).await {
                warn!(
                    parcela_id = old.id,
                    error = %e,
                    "Failed to restore installment"
                );
            }
        }
    }
}
