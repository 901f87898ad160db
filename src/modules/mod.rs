pub mod audit;
pub mod auth;
pub mod health;
pub mod installments;
pub mod invoices;
pub mod locations;
pub mod reports;
pub mod suppliers;
