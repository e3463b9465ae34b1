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
use crate::server::dto::{CreateSectionRequest, UpdateSectionRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_section_name;
use crate::types::Section;

pub async fn create_section(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSectionRequest>,
) -> impl IntoResponse {
    validate_section_name(&req.name)?;

    let now = Utc::now();
    let section = Section {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_section(&section)
        .api_err("Failed to create section")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(section))))
}

pub async fn list_sections(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let sections = state
        .store
        .list_sections()
        .api_err("Failed to list sections")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(sections)))
}

pub async fn get_section(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let section = state
        .store
        .get_section(&id)
        .api_err("Failed to get section")?
        .or_not_found("Section not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(section)))
}

pub async fn update_section(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSectionRequest>,
) -> impl IntoResponse {
    let mut section = state
        .store
        .get_section(&id)
        .api_err("Failed to get section")?
        .or_not_found("Section not found")?;

    if let Some(name) = req.name {
        validate_section_name(&name)?;
        section.name = name;
    }

    section.updated_at = Utc::now();
    state
        .store
        .update_section(&section)
        .api_err("Failed to update section")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(section)))
}

pub async fn delete_section(
    _super_admin: RequireSuperAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let section = state
        .store
        .get_section(&id)
        .api_err("Failed to get section")?
        .or_not_found("Section not found")?;

    state
        .store
        .delete_section(&section.id)
        .api_err("Failed to delete section")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
