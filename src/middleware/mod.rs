pub mod request_id;
pub mod session_auth;

pub use request_id::{RequestId, RequestIdValue};
pub use session_auth::{bearer_token, SessionAuth};
