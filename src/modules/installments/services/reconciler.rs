// Installment reconciler
//
// Keeps a schedule summing to the invoice total after one installment is
// edited by hand. The remaining value is split evenly across every other
// installment, later installments are re-anchored on the edited due date and
// earlier ones keep their dates.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::core::calendar::add_days;
use crate::core::money::{round_cents, validate_amount};
use crate::core::{AppError, Result};
use crate::modules::installments::models::{
    schedule_total, InstallmentDraft, InstallmentEdit, ScheduleTerms,
};

pub struct InstallmentReconciler;

impl InstallmentReconciler {
    /// Apply `edit` to `installments` and redistribute the rest.
    ///
    /// `installments` must be ordered by number. The returned schedule has
    /// the same length and order and always sums to `terms.total_value`.
    pub fn reconcile(
        installments: &[InstallmentDraft],
        edit: &InstallmentEdit,
        terms: &ScheduleTerms,
    ) -> Result<Vec<InstallmentDraft>> {
        let total = terms.total_value;
        let count = installments.len();

        if edit.index >= count {
            return Err(AppError::validation(format!(
                "Parcela {} não existe (a nota possui {} parcelas)",
                edit.index + 1,
                count
            )));
        }
        validate_amount(edit.value).map_err(AppError::validation)?;

        let mut updated = installments.to_vec();
        {
            let edited = &mut updated[edit.index];
            edited.value = edit.value;
            edited.due_date = edit.due_date;
            if let Some(material_status) = edit.material_status {
                edited.material_status = material_status;
            }
        }

        let others = count - 1;
        if others == 0 {
            if edit.value != total {
                return Err(AppError::consistency(format!(
                    "Parcela única deve ser igual ao valor total da nota ({})",
                    total
                )));
            }
            return Ok(updated);
        }

        if edit.value >= total {
            return Err(AppError::validation(format!(
                "Valor da parcela deve ser menor que o valor total da nota ({})",
                total
            )));
        }

        let remaining = total - edit.value;
        let share = Self::share(remaining, others);

        for (position, installment) in updated.iter_mut().enumerate() {
            if position == edit.index {
                continue;
            }
            installment.value = share;
            if position > edit.index {
                let offset = (position - edit.index) as u64 * u64::from(terms.interval_days);
                installment.due_date = add_days(edit.due_date, offset)?;
            }
        }

        let drift = total - schedule_total(&updated);
        if !drift.is_zero() {
            let last_other = if edit.index == count - 1 {
                count - 2
            } else {
                count - 1
            };
            updated[last_other].value += drift;
            debug!(
                drift = %drift,
                installment = updated[last_other].number,
                "Applied rounding drift to installment"
            );
        }

        Ok(updated)
    }

    /// Even share of `remaining` across `others` installments, in cents.
    ///
    /// Rounded half-to-even, unless rounding up would leave the installment
    /// absorbing the drift at or below zero; the share is truncated then.
    fn share(remaining: Decimal, others: usize) -> Decimal {
        let others = Decimal::from(others as u64);
        let share = round_cents(remaining / others);
        if share * others - remaining >= share {
            (remaining / others).round_dp_with_strategy(2, RoundingStrategy::ToZero)
        } else {
            share
        }
    }
}
