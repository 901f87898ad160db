//! Contas Obra: construction purchase invoices and their installment payments
//!
//! Invoices (notas) are split into installment schedules (parcelas) that stay
//! consistent with the invoice total through manual edits. Suppliers,
//! application locations, sessions and an audit log complete the service.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;
pub mod state;
pub mod storage;

// Re-export commonly used types
pub use modules::installments;
pub use modules::invoices;
pub use state::AppState;
pub use storage::Store;
