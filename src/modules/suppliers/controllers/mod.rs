mod supplier_controller;

pub use supplier_controller::configure;
