mod installment_controller;
mod preview_controller;

pub use installment_controller::configure as configure_installments;
pub use preview_controller::{configure as configure_previews, ReconcileRequest};
