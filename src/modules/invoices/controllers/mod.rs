mod invoice_controller;

pub use invoice_controller::{configure, CreateNotaRequest};
