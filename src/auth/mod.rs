mod helpers;
mod middleware;
mod token;

pub use helpers::{CurrentUser, validate_credentials, validate_session_token};
pub use middleware::{AuthError, RequireAdmin, RequireAuth, RequireSuperAdmin};
pub use token::{SessionTokenGenerator, parse_session_token};
