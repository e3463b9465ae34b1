use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireAdmin, RequireSuperAdmin, SessionTokenGenerator};
use crate::server::AppState;
use crate::server::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_username;
use crate::types::User;

pub(super) fn user_to_response(state: &AppState, user: User) -> Result<UserResponse, ApiError> {
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

    Ok(UserResponse::new(user, role, section))
}

pub async fn list_roles(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let roles = state.store.list_roles().api_err("Failed to list roles")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(roles)))
}

pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    validate_username(&req.username)?;

    if req.password.is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }

    state
        .store
        .get_role(&req.role_id)
        .api_err("Failed to check role")?
        .or_not_found("Role not found")?;

    if let Some(section_id) = &req.section_id {
        state
            .store
            .get_section(section_id)
            .api_err("Failed to check section")?
            .or_not_found("Section not found")?;
    }

    let generator = SessionTokenGenerator::new();
    let password_hash = generator
        .hash(&req.password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        password_hash,
        role_id: req.role_id,
        section_id: req.section_id,
        created_at: now,
        updated_at: now,
    };

    state.store.create_user(&user).api_err("Failed to create user")?;

    let response = user_to_response(&state, user)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let users = state.store.list_users().api_err("Failed to list users")?;

    let responses: Vec<UserResponse> = users
        .into_iter()
        .map(|u| user_to_response(&state, u))
        .collect::<Result<Vec<_>, _>>()?;

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn get_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let response = user_to_response(&state, user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

pub async fn update_user(
    RequireAdmin(caller): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let mut user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    if let Some(username) = req.username {
        validate_username(&username)?;
        user.username = username;
    }

    let mut password_changed = false;
    if let Some(password) = req.password {
        if password.is_empty() {
            return Err(ApiError::bad_request("Password cannot be empty"));
        }
        let generator = SessionTokenGenerator::new();
        user.password_hash = generator
            .hash(&password)
            .map_err(|_| ApiError::internal("Failed to hash password"))?;
        password_changed = true;
    }

    if let Some(role_id) = req.role_id {
        // Role reassignment is reserved for superadmins
        if role_id != user.role_id && !caller.role.is_super_admin() {
            return Err(ApiError::forbidden("Only a SuperAdmin can change roles"));
        }
        state
            .store
            .get_role(&role_id)
            .api_err("Failed to check role")?
            .or_not_found("Role not found")?;
        user.role_id = role_id;
    }

    if let Some(section_id) = req.section_id {
        if let Some(section_id) = &section_id {
            state
                .store
                .get_section(section_id)
                .api_err("Failed to check section")?
                .or_not_found("Section not found")?;
        }
        user.section_id = section_id;
    }

    user.updated_at = Utc::now();
    state.store.update_user(&user).api_err("Failed to update user")?;

    // A new password invalidates every session issued under the old one
    if password_changed {
        state
            .store
            .delete_user_sessions(&user.id)
            .api_err("Failed to revoke sessions")?;
    }

    let response = user_to_response(&state, user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

pub async fn delete_user(
    _super_admin: RequireSuperAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    state
        .store
        .delete_user(&user.id)
        .api_err("Failed to delete user")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
