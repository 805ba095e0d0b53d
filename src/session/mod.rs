//! Session context: who is acting and with which role.
//!
//! Tokens are issued by the identity service; this module only validates
//! them and exposes the result as an explicitly passed [`SessionContext`].

pub mod context;
pub mod jwt;
pub mod middleware;
pub mod model;


pub use context::{Role, SessionContext};
pub use jwt::{generate_session_token, session_from_claims, validate_token};
pub use middleware::validate_request_session;
pub use model::Claims;
