// Suppliers (fornecedores) module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::Supplier;
pub use services::SupplierService;
