use chrono::NaiveDate;

use crate::core::calendar::days_until;
use crate::core::BusinessClock;
use crate::modules::installments::models::{Installment, InstallmentStatus};

/// Effective status of an installment on `today`.
///
/// PAGA is sticky. Anything else is VENCIDA once the due date is strictly
/// before today and PENDENTE otherwise, so an installment due today is still
/// pending and a VENCIDA row whose due date moved forward becomes PENDENTE.
pub fn resolve_status(
    due_date: NaiveDate,
    stored: InstallmentStatus,
    today: NaiveDate,
) -> InstallmentStatus {
    if stored == InstallmentStatus::Paga {
        InstallmentStatus::Paga
    } else if days_until(due_date, today) < 0 {
        InstallmentStatus::Vencida
    } else {
        InstallmentStatus::Pendente
    }
}

/// Resolves installment statuses against the business clock
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusResolver {
    clock: BusinessClock,
}

impl StatusResolver {
    pub fn new(clock: BusinessClock) -> Self {
        Self { clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn resolve(&self, installment: &Installment) -> InstallmentStatus {
        resolve_status(installment.due_date, installment.status, self.clock.today())
    }

    /// The status to persist when it differs from the stored one
    pub fn pending_change(&self, installment: &Installment) -> Option<InstallmentStatus> {
        let resolved = self.resolve(installment);
        (resolved != installment.status).then_some(resolved)
    }
}
