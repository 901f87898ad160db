use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Violations;
use crate::modules::invoices::models::{MaterialStatus, MAX_INSTALLMENTS};

use super::installment::InstallmentStatus;

/// Parameters an installment schedule is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTerms {
    pub total_value: Decimal,
    pub count: u32,
    /// Days from the issue date to the first installment
    pub days_to_first: u32,
    /// Days between consecutive installments
    pub interval_days: u32,
    pub issue_date: NaiveDate,
}

impl ScheduleTerms {
    /// Violations that make the terms unschedulable.
    ///
    /// The first installment falls at least one day after the issue date and
    /// consecutive installments are at least one day apart. Single payment
    /// invoices due on the issue date bypass these terms entirely.
    pub fn violations(&self) -> Violations {
        let mut violations = Violations::new();

        if self.total_value <= Decimal::ZERO {
            violations.push("Valor total deve ser maior que zero");
        }

        if !(1..=MAX_INSTALLMENTS).contains(&self.count) {
            violations.push(format!(
                "Número de parcelas deve estar entre 1 e {}, recebido {}",
                MAX_INSTALLMENTS, self.count
            ));
        }

        if self.days_to_first == 0 {
            violations.push("Dias até a primeira parcela deve ser maior que zero");
        }

        if self.count > 1 && self.interval_days == 0 {
            violations.push("Intervalo entre parcelas deve ser maior que zero");
        }

        violations
    }

    pub fn with_count(self, count: u32) -> Self {
        Self { count, ..self }
    }
}

/// One row of an unsaved (or reloaded) schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentDraft {
    /// Store identifier when the row is already persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub number: u32,
    pub value: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: InstallmentStatus,
    #[serde(default)]
    pub material_status: MaterialStatus,
}

/// A manual change to one installment of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentEdit {
    /// 0-based position in the ordered schedule
    pub index: usize,
    pub value: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub material_status: Option<MaterialStatus>,
}

/// Sum of the values of a schedule
pub fn schedule_total(installments: &[InstallmentDraft]) -> Decimal {
    installments.iter().map(|i| i.value).sum()
}
