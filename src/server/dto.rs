use serde::{Deserialize, Serialize};

use crate::types::{RecordDetail, Role, Section, User};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Client-safe user projection: nested role and section, password hash
/// never present.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserResponse {
    #[must_use]
    pub fn new(user: User, role: Role, section: Option<Section>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role_id: user.role_id,
            role,
            section_id: user.section_id,
            section,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role_id: String,
    #[serde(default)]
    pub section_id: Option<String>,
}

/// Patch bodies only admit mutable fields; unknown keys (id, created_at,
/// and anything mistyped) are rejected outright.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default, with = "double_option")]
    pub section_id: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSectionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSectionRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateShiftRequest {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateShiftRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    /// Defaults to the caller; naming another user requires Admin.
    #[serde(default)]
    pub user_id: Option<String>,
    pub section_id: String,
    pub shift_id: String,
    #[serde(default)]
    pub detail: Option<RecordDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRecordRequest {
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub shift_id: Option<String>,
    #[serde(default)]
    pub detail: Option<RecordDetail>,
}

/// Distinguishes an absent field from an explicit null so a patch can
/// clear a user's section assignment.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}
