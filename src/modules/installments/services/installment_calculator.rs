use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::core::calendar::add_days;
use crate::core::money::{round_cents, validate_amount};
use crate::core::{AppError, Result};
use crate::modules::installments::models::{
    schedule_total, InstallmentDraft, InstallmentStatus, ScheduleTerms,
};
use crate::modules::invoices::models::MaterialStatus;

/// Calculator for installment schedules.
///
/// Splits an invoice total evenly across installments; the last installment
/// absorbs the rounding difference so the schedule always sums exactly to
/// the total.
pub struct InstallmentCalculator;

impl InstallmentCalculator {
    /// Compute the installment schedule for the given terms.
    ///
    /// Installment `i` (0-based) is due `days_to_first + i * interval_days`
    /// days after the issue date, starts as PENDENTE and in stock.
    pub fn schedule(terms: &ScheduleTerms) -> Result<Vec<InstallmentDraft>> {
        terms.violations().into_result()?;

        let amounts = Self::calculate_equal_amounts(terms.total_value, terms.count as usize)?;
        let first_due = add_days(terms.issue_date, u64::from(terms.days_to_first))?;

        let mut drafts = Vec::with_capacity(amounts.len());
        for (i, value) in amounts.into_iter().enumerate() {
            let offset = i as u64 * u64::from(terms.interval_days);
            drafts.push(InstallmentDraft {
                id: None,
                number: i as u32 + 1,
                value,
                due_date: add_days(first_due, offset)?,
                status: InstallmentStatus::Pendente,
                material_status: MaterialStatus::Estoque,
            });
        }

        debug_assert_eq!(schedule_total(&drafts), terms.total_value);

        debug!(
            count = drafts.len(),
            total = %terms.total_value,
            "Calculated installment schedule"
        );

        Ok(drafts)
    }

    /// The one installment of a single payment invoice: the full value, due
    /// on the issue date.
    pub fn single_payment(total: Decimal, issue_date: NaiveDate) -> Result<Vec<InstallmentDraft>> {
        validate_amount(total).map_err(AppError::validation)?;

        Ok(vec![InstallmentDraft {
            id: None,
            number: 1,
            value: total,
            due_date: issue_date,
            status: InstallmentStatus::Pendente,
            material_status: MaterialStatus::Estoque,
        }])
    }

    /// Re-derive every value and due date of an existing schedule from the
    /// terms, discarding manual edits.
    ///
    /// Identifiers, payment status and material status of each position are
    /// kept. The schedule length decides the installment count.
    pub fn recompute_all(
        existing: &[InstallmentDraft],
        terms: &ScheduleTerms,
    ) -> Result<Vec<InstallmentDraft>> {
        if existing.is_empty() {
            return Err(AppError::validation("Nenhuma parcela para recalcular"));
        }

        let fresh = Self::schedule(&terms.with_count(existing.len() as u32))?;
        Ok(Self::carry_over(existing, fresh))
    }

    /// `recompute_all` for a single payment invoice
    pub fn recompute_single_payment(
        existing: &[InstallmentDraft],
        total: Decimal,
        issue_date: NaiveDate,
    ) -> Result<Vec<InstallmentDraft>> {
        if existing.len() != 1 {
            return Err(AppError::consistency(format!(
                "Nota à vista deve possuir uma parcela, encontradas {}",
                existing.len()
            )));
        }

        let fresh = Self::single_payment(total, issue_date)?;
        Ok(Self::carry_over(existing, fresh))
    }

    fn carry_over(existing: &[InstallmentDraft], fresh: Vec<InstallmentDraft>) -> Vec<InstallmentDraft> {
        existing
            .iter()
            .zip(fresh)
            .map(|(old, new)| InstallmentDraft {
                id: old.id,
                status: old.status,
                material_status: old.material_status,
                ..new
            })
            .collect()
    }

    /// Equal split rounded to cents; the last amount absorbs the difference.
    pub fn calculate_equal_amounts(total: Decimal, count: usize) -> Result<Vec<Decimal>> {
        if count == 0 {
            return Err(AppError::validation("Installment count cannot be zero"));
        }

        let base_amount = round_cents(total / Decimal::from(count as u64));
        let mut amounts = vec![base_amount; count];

        let computed: Decimal = amounts.iter().sum();
        if let Some(last) = amounts.last_mut() {
            *last += total - computed;
        }

        if amounts.iter().any(|amount| *amount <= Decimal::ZERO) {
            return Err(AppError::validation(
                "Calculated installment amount must be positive",
            ));
        }

        Ok(amounts)
    }
}
