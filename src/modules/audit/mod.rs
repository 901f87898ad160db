// Audit log (logs_sistema)

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use services::{Actor, AuditEvent, AuditLogger};
