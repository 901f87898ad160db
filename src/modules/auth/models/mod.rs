mod session;
mod user;

pub use session::{Credentials, ProviderSession, ProviderUser, Session};
pub use user::{
    default_name, NewUser, Registration, RegistrationForm, User, UserFilter, UserPatch,
    DEFAULT_ROLE,
};
