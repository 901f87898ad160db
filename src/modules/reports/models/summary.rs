use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::installments::models::{Installment, InstallmentStatus};

/// `vw_total_de_notas`: sum of every invoice total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TotalDeNotas {
    pub total_de_notas: Decimal,
}

/// `vw_resumo_notas_parcelas`
///
/// Stock and in-use totals are sums of installment values by material
/// status; `total_a_pagar` sums every installment not yet paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResumoNotasParcelas {
    pub total_em_estoque: Decimal,
    pub total_em_uso: Decimal,
    pub total_de_notas: Decimal,
    pub total_a_pagar: Decimal,
}

/// Installments due in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub installments: Vec<Installment>,
    pub total_pago: Decimal,
    pub total_pendente: Decimal,
    pub total_vencido: Decimal,
}

impl MonthlyReport {
    pub fn new(year: i32, month: u32, installments: Vec<Installment>) -> Self {
        let sum = |status: InstallmentStatus| -> Decimal {
            installments
                .iter()
                .filter(|i| i.status == status)
                .map(|i| i.value)
                .sum()
        };

        Self {
            year,
            month,
            total_pago: sum(InstallmentStatus::Paga),
            total_pendente: sum(InstallmentStatus::Pendente),
            total_vencido: sum(InstallmentStatus::Vencida),
            installments,
        }
    }
}

/// Installment counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pendente: u64,
    pub paga: u64,
    pub vencida: u64,
}

impl StatusCounts {
    pub fn tally<'a>(installments: impl IntoIterator<Item = &'a Installment>) -> Self {
        installments
            .into_iter()
            .fold(Self::default(), |mut counts, installment| {
                match installment.status {
                    InstallmentStatus::Pendente => counts.pendente += 1,
                    InstallmentStatus::Paga => counts.paga += 1,
                    InstallmentStatus::Vencida => counts.vencida += 1,
                }
                counts
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub invoice_count: u64,
    pub invoice_total: Decimal,
    pub installments: StatusCounts,
    pub summary: ResumoNotasParcelas,
}
