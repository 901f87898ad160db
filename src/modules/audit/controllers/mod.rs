mod log_controller;

pub use log_controller::configure;
