mod installment;
mod schedule;

pub use installment::{
    Installment, InstallmentFilter, InstallmentPatch, InstallmentStatus, NewInstallment,
};
pub use schedule::{schedule_total, InstallmentDraft, InstallmentEdit, ScheduleTerms};
