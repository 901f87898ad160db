// Authentication gateway and sessions

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Session, User};
pub use services::{AuthService, IdentityProvider, SessionRegistry};
