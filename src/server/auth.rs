use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{RequireAuth, SessionTokenGenerator, validate_credentials};
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LoginResponse, UserResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::types::Session;

const SESSION_TTL_DAYS: i64 = 7;
const MAX_RETRIES: u32 = 3;

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = validate_credentials(state.store.as_ref(), &req.username, &req.password)
        .api_err("Failed to validate credentials")?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let role = state
        .store
        .get_role(&user.role_id)
        .api_err("Failed to load role")?
        .ok_or_else(|| ApiError::internal("User role missing"))?;

    let section = match &user.section_id {
        Some(section_id) => state
            .store
            .get_section(section_id)
            .api_err("Failed to load section")?,
        None => None,
    };

    let generator = SessionTokenGenerator::new();
    let expires_at = Some(Utc::now() + Duration::days(SESSION_TTL_DAYS));

    for _ in 0..MAX_RETRIES {
        let (raw_token, lookup, hash) = generator
            .generate()
            .map_err(|_| ApiError::internal("Failed to generate session token"))?;

        let session = Session {
            id: Uuid::new_v4().to_string(),
            token_hash: hash,
            token_lookup: lookup,
            user_id: user.id.clone(),
            created_at: Utc::now(),
            expires_at,
            last_used_at: None,
        };

        match state.store.create_session(&session) {
            Ok(()) => {
                return Ok(Json(ApiResponse::success(LoginResponse {
                    access_token: raw_token,
                    user: UserResponse::new(user, role, section),
                })));
            }
            Err(crate::error::Error::SessionLookupCollision) => continue,
            Err(_) => return Err(ApiError::internal("Failed to create session")),
        }
    }

    Err(ApiError::internal("Failed to create session after retries"))
}

/// Revokes the session the request authenticated with. The token stops
/// working immediately; other sessions for the same user are untouched.
pub async fn logout(
    RequireAuth(caller): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state
        .store
        .delete_session(&caller.session_id)
        .api_err("Failed to revoke session")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        serde_json::json!({"message": "Logged out"}),
    )))
}
