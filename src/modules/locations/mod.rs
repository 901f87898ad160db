// Application locations (locais de aplicação) module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::Location;
pub use services::LocationService;
