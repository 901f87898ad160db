pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Installment, InstallmentDraft, InstallmentStatus, ScheduleTerms};
pub use repositories::MySqlInstallmentRepository;
pub use services::{InstallmentCalculator, InstallmentReconciler, InstallmentService, StatusResolver};
