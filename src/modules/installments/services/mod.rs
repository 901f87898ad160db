mod installment_calculator;
mod installment_service;
mod reconciler;
mod schedule_preview;
mod status_resolver;

pub use installment_calculator::InstallmentCalculator;
pub use installment_service::{InstallmentChange, InstallmentService};
pub use reconciler::InstallmentReconciler;
pub use schedule_preview::SchedulePreview;
pub use status_resolver::{resolve_status, StatusResolver};
