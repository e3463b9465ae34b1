use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::helpers::{CurrentUser, SessionValidationError, validate_session_token};
use crate::server::AppState;

/// Extractor that requires any valid authenticated user
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires an Admin or SuperAdmin caller
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that requires a SuperAdmin caller
pub struct RequireSuperAdmin(pub CurrentUser);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    SessionExpired,
    NotAdmin,
    NotSuperAdmin,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::SessionExpired => (StatusCode::UNAUTHORIZED, "Session expired"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::NotSuperAdmin => (StatusCode::FORBIDDEN, "SuperAdmin access required"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                "WWW-Authenticate",
                "Bearer realm=\"shifttrack\"".parse().unwrap(),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let current = extract_and_validate_token(parts, state)?;
        Ok(RequireAuth(current))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let current = extract_and_validate_token(parts, state)?;

        if !current.role.is_admin() {
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin(current))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSuperAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let current = extract_and_validate_token(parts, state)?;

        if !current.role.is_super_admin() {
            return Err(AuthError::NotSuperAdmin);
        }

        Ok(RequireSuperAdmin(current))
    }
}

fn extract_and_validate_token(
    parts: &mut Parts,
    state: &Arc<AppState>,
) -> Result<CurrentUser, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let raw_token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            header.trim_start_matches("Bearer ").to_string()
        }
        Some(_) => return Err(AuthError::InvalidScheme),
        None => return Err(AuthError::MissingAuth),
    };

    validate_session_token(state.store.as_ref(), &raw_token).map_err(|e| match e {
        SessionValidationError::InvalidToken => AuthError::InvalidToken,
        SessionValidationError::SessionExpired => AuthError::SessionExpired,
        SessionValidationError::InternalError => AuthError::InternalError,
    })
}
