mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Role operations (seeded reference data)
    fn create_role(&self, role: &Role) -> Result<()>;
    fn get_role(&self, id: &str) -> Result<Option<Role>>;
    fn get_role_by_name(&self, name: &str) -> Result<Option<Role>>;
    fn list_roles(&self) -> Result<Vec<Role>>;

    // Section operations
    fn create_section(&self, section: &Section) -> Result<()>;
    fn get_section(&self, id: &str) -> Result<Option<Section>>;
    fn get_section_by_name(&self, name: &str) -> Result<Option<Section>>;
    fn list_sections(&self) -> Result<Vec<Section>>;
    fn update_section(&self, section: &Section) -> Result<()>;
    fn delete_section(&self, id: &str) -> Result<bool>;

    // Shift operations
    fn create_shift(&self, shift: &Shift) -> Result<()>;
    fn get_shift(&self, id: &str) -> Result<Option<Shift>>;
    fn list_shifts(&self) -> Result<Vec<Shift>>;
    fn update_shift(&self, shift: &Shift) -> Result<()>;
    fn delete_shift(&self, id: &str) -> Result<bool>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, id: &str) -> Result<bool>;

    // Record operations. Creation persists the record and its detail row
    // in one transaction so the section/detail pairing can never be
    // half-written. Reads eager-load user/section/shift/detail and order
    // newest first.
    fn create_record(&self, record: &Record, detail: Option<&RecordDetail>) -> Result<()>;
    fn get_record(&self, id: &str) -> Result<Option<RecordWithRelations>>;
    fn list_records(&self) -> Result<Vec<RecordWithRelations>>;
    fn list_user_records(&self, user_id: &str) -> Result<Vec<RecordWithRelations>>;
    fn update_record(&self, record: &Record, detail: Option<&RecordDetail>) -> Result<()>;
    fn delete_record(&self, id: &str) -> Result<bool>;

    // Session operations
    fn create_session(&self, session: &Session) -> Result<()>;
    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>>;
    fn delete_session(&self, id: &str) -> Result<bool>;
    fn delete_user_sessions(&self, user_id: &str) -> Result<()>;
    fn update_session_last_used(&self, id: &str) -> Result<()>;

    fn close(&self) -> Result<()>;
}
