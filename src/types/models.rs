use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shift times are HH:MM:SS strings. The overnight shift wraps past
/// midnight (end before start); that is reference data, not validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One submitted shift report. At most one detail row exists per record,
/// and its variant matches the record's section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub user_id: String,
    pub section_id: String,
    pub shift_id: String,
    pub created_at: DateTime<Utc>,
}

/// Section-specific metrics attached 1:1 to a record. The tag is the
/// section the metrics belong to, so a record's section determines which
/// variant may be stored for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "lowercase")]
pub enum RecordDetail {
    Ccs(CcsDetails),
    Baf(BafDetails),
    Slitter(SlitterDetails),
}

impl RecordDetail {
    /// The section name this detail variant belongs to.
    #[must_use]
    pub fn section_name(&self) -> &'static str {
        match self {
            RecordDetail::Ccs(_) => "CCS",
            RecordDetail::Baf(_) => "BAF",
            RecordDetail::Slitter(_) => "Slitter",
        }
    }

    #[must_use]
    pub fn as_ccs(&self) -> Option<&CcsDetails> {
        match self {
            RecordDetail::Ccs(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CcsDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baf_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baf_out: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm_out: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_out: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tugger_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tugger_off: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_trucks_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_trucks_out: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_movements: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_trucks: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved_of_shipping: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slitter_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slitter_off: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coils_hatted: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BafDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_downtime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlitterDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coils_processed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrap_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blade_changes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Session tokens are opaque bearer credentials bound to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// User as embedded in a record listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

/// A record with its related rows eager-loaded for listings and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordWithRelations {
    #[serde(flatten)]
    pub record: Record,
    pub user: UserSummary,
    pub section: Section,
    pub shift: Shift,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<RecordDetail>,
}
