mod access_code;
mod auth_service;
mod identity_provider;
mod session_registry;

pub use access_code::{hash_secret, verify_secret, AccessCodeVerifier};
pub use auth_service::AuthService;
pub use identity_provider::{GoTrueProvider, IdentityProvider};
pub use session_registry::SessionRegistry;
