use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Record, Result};
use crate::modules::invoices::models::MaterialStatus;

use super::schedule::InstallmentDraft;

/// Installment payment status.
///
/// PENDENTE → VENCIDA happens automatically once the due date passes;
/// PENDENTE/VENCIDA → PAGA is a user action. PAGA is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InstallmentStatus {
    /// Not yet paid, due date not passed
    #[default]
    #[serde(rename = "PENDENTE")]
    Pendente,
    /// Paid (terminal)
    #[serde(rename = "PAGA")]
    Paga,
    /// Due date passed without payment
    #[serde(rename = "VENCIDA")]
    Vencida,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "PENDENTE",
            Self::Paga => "PAGA",
            Self::Vencida => "VENCIDA",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paga)
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InstallmentStatus {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "PENDENTE" => Ok(Self::Pendente),
            "PAGA" => Ok(Self::Paga),
            "VENCIDA" => Ok(Self::Vencida),
            _ => Err(format!("Invalid installment status: {}", value)),
        }
    }
}

/// Persisted installment (parcela) of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: i64,
    pub invoice_id: i64,
    /// 1-based, unique within the invoice
    pub number: u32,
    pub value: Decimal,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    /// Set only when the installment becomes PAGA
    pub payment_date: Option<NaiveDate>,
    pub material_status: MaterialStatus,
}

impl Installment {
    /// Transition to PAGA, stamping the payment date
    pub fn mark_as_paid(&mut self, payment_date: NaiveDate) -> Result<()> {
        if self.status == InstallmentStatus::Paga {
            return Err(AppError::validation(format!(
                "Parcela {} já está paga",
                self.number
            )));
        }

        self.status = InstallmentStatus::Paga;
        self.payment_date = Some(payment_date);
        Ok(())
    }

    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paga
    }

    /// Preview row carrying this installment's identity
    pub fn to_draft(&self) -> InstallmentDraft {
        InstallmentDraft {
            id: Some(self.id),
            number: self.number,
            value: self.value,
            due_date: self.due_date,
            status: self.status,
            material_status: self.material_status,
        }
    }
}

/// Insert payload for the `parcelas` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInstallment {
    pub invoice_id: i64,
    pub number: u32,
    pub value: Decimal,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub material_status: MaterialStatus,
}

impl NewInstallment {
    pub fn from_draft(invoice_id: i64, draft: &InstallmentDraft) -> Self {
        Self {
            invoice_id,
            number: draft.number,
            value: draft.value,
            due_date: draft.due_date,
            status: InstallmentStatus::Pendente,
            material_status: draft.material_status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPatch {
    pub value: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InstallmentStatus>,
    pub payment_date: Option<NaiveDate>,
    pub material_status: Option<MaterialStatus>,
}

impl InstallmentPatch {
    pub fn status(status: InstallmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.payment_date.is_none()
            && self.material_status.is_none()
    }
}

/// Select criteria; the due-date range is half-open `[due_from, due_before)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallmentFilter {
    pub invoice_id: Option<i64>,
    pub status: Option<InstallmentStatus>,
    pub due_from: Option<NaiveDate>,
    pub due_before: Option<NaiveDate>,
}

impl InstallmentFilter {
    pub fn for_invoice(invoice_id: i64) -> Self {
        Self {
            invoice_id: Some(invoice_id),
            ..Default::default()
        }
    }
}

impl Record for Installment {
    type Draft = NewInstallment;
    type Patch = InstallmentPatch;
    type Filter = InstallmentFilter;

    const TABLE: &'static str = "parcelas";

    fn id(&self) -> i64 {
        self.id
    }
}
