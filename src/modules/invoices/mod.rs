// Invoices (notas) module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Invoice, MaterialStatus};
pub use repositories::MySqlInvoiceRepository;
pub use services::{InvoiceDetail, InvoiceService};
