use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireAdmin, RequireAuth};
use crate::server::AppState;
use crate::server::dto::{CreateRecordRequest, UpdateRecordRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{Record, RecordDetail, Section};

/// The detail variant must belong to the record's section. This is the
/// structural invariant tying the 1:1 detail tables to sections.
fn check_detail_matches_section(
    detail: Option<&RecordDetail>,
    section: &Section,
) -> Result<(), ApiError> {
    if let Some(detail) = detail {
        if detail.section_name() != section.name {
            return Err(ApiError::bad_request(format!(
                "Detail payload is for section {} but the record belongs to {}",
                detail.section_name(),
                section.name
            )));
        }
    }
    Ok(())
}

pub async fn create_record(
    RequireAuth(caller): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRecordRequest>,
) -> impl IntoResponse {
    // Workers submit their own records; only admins may file for others.
    let user_id = match req.user_id {
        Some(user_id) if user_id != caller.user.id => {
            if !caller.role.is_admin() {
                return Err(ApiError::forbidden(
                    "Cannot create a record for another user",
                ));
            }
            state
                .store
                .get_user(&user_id)
                .api_err("Failed to check user")?
                .or_not_found("User not found")?;
            user_id
        }
        _ => caller.user.id.clone(),
    };

    let section = state
        .store
        .get_section(&req.section_id)
        .api_err("Failed to check section")?
        .or_not_found("Section not found")?;

    state
        .store
        .get_shift(&req.shift_id)
        .api_err("Failed to check shift")?
        .or_not_found("Shift not found")?;

    check_detail_matches_section(req.detail.as_ref(), &section)?;

    let record = Record {
        id: Uuid::new_v4().to_string(),
        user_id,
        section_id: req.section_id,
        shift_id: req.shift_id,
        created_at: Utc::now(),
    };

    state
        .store
        .create_record(&record, req.detail.as_ref())
        .api_err("Failed to create record")?;

    let created = state
        .store
        .get_record(&record.id)
        .api_err("Failed to load record")?
        .ok_or_else(|| ApiError::internal("Record missing after create"))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_records(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let records = state
        .store
        .list_records()
        .api_err("Failed to list records")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(records)))
}

pub async fn list_my_records(
    RequireAuth(caller): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let records = state
        .store
        .list_user_records(&caller.user.id)
        .api_err("Failed to list records")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(records)))
}

pub async fn get_record(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let record = state
        .store
        .get_record(&id)
        .api_err("Failed to get record")?
        .or_not_found("Record not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(record)))
}

pub async fn update_record(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRecordRequest>,
) -> impl IntoResponse {
    let existing = state
        .store
        .get_record(&id)
        .api_err("Failed to get record")?
        .or_not_found("Record not found")?;

    let mut record = existing.record;

    if let Some(section_id) = req.section_id {
        state
            .store
            .get_section(&section_id)
            .api_err("Failed to check section")?
            .or_not_found("Section not found")?;
        record.section_id = section_id;
    }

    if let Some(shift_id) = req.shift_id {
        state
            .store
            .get_shift(&shift_id)
            .api_err("Failed to check shift")?
            .or_not_found("Shift not found")?;
        record.shift_id = shift_id;
    }

    // Validate the detail (provided or already stored) against the
    // post-merge section.
    let section = state
        .store
        .get_section(&record.section_id)
        .api_err("Failed to load section")?
        .ok_or_else(|| ApiError::internal("Section missing"))?;

    let detail = req.detail.or(existing.detail);
    check_detail_matches_section(detail.as_ref(), &section)?;

    state
        .store
        .update_record(&record, detail.as_ref())
        .api_err("Failed to update record")?;

    let updated = state
        .store
        .get_record(&record.id)
        .api_err("Failed to load record")?
        .ok_or_else(|| ApiError::internal("Record missing after update"))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(updated)))
}

pub async fn delete_record(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let record = state
        .store
        .get_record(&id)
        .api_err("Failed to get record")?
        .or_not_found("Record not found")?;

    state
        .store
        .delete_record(&record.record.id)
        .api_err("Failed to delete record")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
