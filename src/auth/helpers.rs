use chrono::Utc;

use super::{SessionTokenGenerator, parse_session_token};
use crate::error::Result;
use crate::store::Store;
use crate::types::{RoleName, User};

#[derive(Debug)]
pub enum SessionValidationError {
    InvalidToken,
    SessionExpired,
    InternalError,
}

/// The authenticated caller: the user row, its resolved role name, and
/// the session the request authenticated with.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub role: RoleName,
    pub session_id: String,
}

impl CurrentUser {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// Looks up a user by username and compares the password against the
/// stored hash. Returns the user on a match, None otherwise. No lockout,
/// no rate limiting.
pub fn validate_credentials(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let Some(user) = store.get_user_by_username(username)? else {
        return Ok(None);
    };

    let generator = SessionTokenGenerator::new();
    if generator.verify(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Validates a raw bearer token against the sessions table and resolves
/// the owning user and role.
pub fn validate_session_token(
    store: &dyn Store,
    raw_token: &str,
) -> std::result::Result<CurrentUser, SessionValidationError> {
    let (lookup, _secret) =
        parse_session_token(raw_token).map_err(|_| SessionValidationError::InvalidToken)?;

    let session = store
        .get_session_by_lookup(&lookup)
        .map_err(|_| SessionValidationError::InternalError)?
        .ok_or(SessionValidationError::InvalidToken)?;

    let generator = SessionTokenGenerator::new();
    if !generator
        .verify(raw_token, &session.token_hash)
        .map_err(|_| SessionValidationError::InternalError)?
    {
        return Err(SessionValidationError::InvalidToken);
    }

    if let Some(expires_at) = &session.expires_at {
        if expires_at < &Utc::now() {
            return Err(SessionValidationError::SessionExpired);
        }
    }

    let user = store
        .get_user(&session.user_id)
        .map_err(|_| SessionValidationError::InternalError)?
        .ok_or(SessionValidationError::InvalidToken)?;

    let role = store
        .get_role(&user.role_id)
        .map_err(|_| SessionValidationError::InternalError)?
        .and_then(|r| RoleName::parse(&r.name))
        .ok_or(SessionValidationError::InternalError)?;

    if let Err(e) = store.update_session_last_used(&session.id) {
        tracing::warn!("Failed to update session last_used_at: {e}");
    }

    Ok(CurrentUser {
        user,
        role,
        session_id: session.id,
    })
}
