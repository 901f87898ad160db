use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::{AppError, Repository, Result, SummaryViews};
use crate::modules::installments::models::InstallmentFilter;
use crate::modules::installments::services::InstallmentService;
use crate::modules::invoices::models::{Invoice, InvoiceFilter};
use crate::modules::reports::models::{Dashboard, MonthlyReport, ResumoNotasParcelas, StatusCounts, TotalDeNotas};

/// Service for payment reports and the dashboard
#[derive(Clone)]
pub struct ReportService {
    invoices: Arc<dyn Repository<Invoice>>,
    installments: InstallmentService,
    views: Arc<dyn SummaryViews>,
}

impl ReportService {
    pub fn new(
        invoices: Arc<dyn Repository<Invoice>>,
        installments: InstallmentService,
        views: Arc<dyn SummaryViews>,
    ) -> Self {
        Self {
            invoices,
            installments,
            views,
        }
    }

    /// Installments due in the given month with paid / pending / overdue totals
    pub async fn monthly_report(&self, year: i32, month: u32) -> Result<MonthlyReport> {
        let (first_day, next_month) = month_bounds(year, month)?;

        let installments = self
            .installments
            .list(&InstallmentFilter {
                due_from: Some(first_day),
                due_before: Some(next_month),
                ..Default::default()
            })
            .await?;

        let report = MonthlyReport::new(year, month, installments);

        if report.installments.is_empty() {
            warn!(year, month, "Empty monthly report generated");
        } else {
            info!(
                year,
                month,
                parcela_count = report.installments.len(),
                total_pago = %report.total_pago,
                total_pendente = %report.total_pendente,
                total_vencido = %report.total_vencido,
                "Monthly report generated"
            );
        }

        Ok(report)
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        let invoices = self.invoices.select(&InvoiceFilter::default()).await?;
        let installments = self.installments.list(&InstallmentFilter::default()).await?;
        let TotalDeNotas { total_de_notas } = self.views.total_de_notas().await?;
        let summary = self.views.resumo_notas_parcelas().await?;

        Ok(Dashboard {
            invoice_count: invoices.len() as u64,
            invoice_total: total_de_notas,
            installments: StatusCounts::tally(&installments),
            summary,
        })
    }

    pub async fn summary(&self) -> Result<ResumoNotasParcelas> {
        self.views.resumo_notas_parcelas().await
    }
}

/// First day of the month and first day of the following month
fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::validation(format!("Mês inválido: {}-{:02}", year, month));

    let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_month = if first_day.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((first_day, next_month))
}
