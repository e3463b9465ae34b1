use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireAdmin, RequireAuth, RequireSuperAdmin};
use crate::server::AppState;
use crate::server::dto::{CreateShiftRequest, UpdateShiftRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_shift_name, validate_shift_time};
use crate::types::Shift;

pub async fn create_shift(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateShiftRequest>,
) -> impl IntoResponse {
    validate_shift_name(&req.name)?;
    validate_shift_time("start_time", &req.start_time)?;
    validate_shift_time("end_time", &req.end_time)?;

    let now = Utc::now();
    let shift = Shift {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        start_time: req.start_time,
        end_time: req.end_time,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_shift(&shift)
        .api_err("Failed to create shift")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(shift))))
}

pub async fn list_shifts(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let shifts = state.store.list_shifts().api_err("Failed to list shifts")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(shifts)))
}

pub async fn get_shift(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let shift = state
        .store
        .get_shift(&id)
        .api_err("Failed to get shift")?
        .or_not_found("Shift not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(shift)))
}

pub async fn update_shift(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateShiftRequest>,
) -> impl IntoResponse {
    let mut shift = state
        .store
        .get_shift(&id)
        .api_err("Failed to get shift")?
        .or_not_found("Shift not found")?;

    if let Some(name) = req.name {
        validate_shift_name(&name)?;
        shift.name = name;
    }

    if let Some(start_time) = req.start_time {
        validate_shift_time("start_time", &start_time)?;
        shift.start_time = start_time;
    }

    if let Some(end_time) = req.end_time {
        validate_shift_time("end_time", &end_time)?;
        shift.end_time = end_time;
    }

    shift.updated_at = Utc::now();
    state
        .store
        .update_shift(&shift)
        .api_err("Failed to update shift")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(shift)))
}

pub async fn delete_shift(
    _super_admin: RequireSuperAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let shift = state
        .store
        .get_shift(&id)
        .api_err("Failed to get shift")?
        .or_not_found("Shift not found")?;

    state
        .store
        .delete_shift(&shift.id)
        .api_err("Failed to delete shift")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
