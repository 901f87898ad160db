use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::installments::models::{
    schedule_total, InstallmentDraft, InstallmentEdit, ScheduleTerms,
};

use super::installment_calculator::InstallmentCalculator;
use super::reconciler::InstallmentReconciler;

/// Draft schedule of one user's invoice form, before it is saved.
///
/// Edits are applied all-or-nothing: a rejected edit leaves the preview as
/// it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePreview {
    pub terms: ScheduleTerms,
    pub installments: Vec<InstallmentDraft>,
}

impl SchedulePreview {
    pub fn compute(terms: ScheduleTerms) -> Result<Self> {
        let installments = InstallmentCalculator::schedule(&terms)?;
        Ok(Self {
            terms,
            installments,
        })
    }

    pub fn apply_edit(&mut self, edit: &InstallmentEdit) -> Result<()> {
        self.verify()?;
        self.installments = InstallmentReconciler::reconcile(&self.installments, edit, &self.terms)?;
        Ok(())
    }

    /// Discards manual edits and re-derives the schedule from the terms
    pub fn recalculate(&mut self) -> Result<()> {
        self.installments = InstallmentCalculator::recompute_all(&self.installments, &self.terms)?;
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        schedule_total(&self.installments)
    }

    /// Checks a preview received from a client before it is trusted: the
    /// terms are schedulable, numbers run 1..N, N matches the terms and the
    /// values sum to the total.
    pub fn verify(&self) -> Result<()> {
        self.terms.violations().into_result()?;

        let count = self.installments.len();
        if count as u32 != self.terms.count {
            return Err(AppError::validation(format!(
                "Pré-visualização possui {} parcelas, esperado {}",
                count, self.terms.count
            )));
        }

        let contiguous = self
            .installments
            .iter()
            .enumerate()
            .all(|(i, draft)| draft.number as usize == i + 1);
        if !contiguous {
            return Err(AppError::validation(
                "Parcelas da pré-visualização devem ser numeradas de 1 a N",
            ));
        }

        if self.total() != self.terms.total_value {
            return Err(AppError::consistency(format!(
                "Soma das parcelas ({}) difere do valor total da nota ({})",
                self.total(),
                self.terms.total_value
            )));
        }

        Ok(())
    }

    pub fn into_installments(self) -> Vec<InstallmentDraft> {
        self.installments
    }
}
