use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Translates unique-constraint violations into domain errors so handlers
/// can answer with 409 instead of a generic storage failure.
fn map_insert_error(e: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(err, Some(ref msg)) = e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("sessions.token_lookup") {
                return Error::SessionLookupCollision;
            }
            if msg.contains("UNIQUE") {
                return Error::AlreadyExists;
            }
        }
    }
    Error::Database(e)
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
        updated_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

fn shift_from_row(row: &Row<'_>) -> rusqlite::Result<Shift> {
    Ok(Shift {
        id: row.get(0)?,
        name: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role_id: row.get(3)?,
        section_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

/// Joined record row: record columns, then username, section, shift.
fn record_with_relations_from_row(row: &Row<'_>) -> rusqlite::Result<RecordWithRelations> {
    Ok(RecordWithRelations {
        record: Record {
            id: row.get(0)?,
            user_id: row.get(1)?,
            section_id: row.get(2)?,
            shift_id: row.get(3)?,
            created_at: parse_datetime(&row.get::<_, String>(4)?),
        },
        user: UserSummary {
            id: row.get(1)?,
            username: row.get(5)?,
        },
        section: Section {
            id: row.get(2)?,
            name: row.get(6)?,
            created_at: parse_datetime(&row.get::<_, String>(7)?),
            updated_at: parse_datetime(&row.get::<_, String>(8)?),
        },
        shift: Shift {
            id: row.get(3)?,
            name: row.get(9)?,
            start_time: row.get(10)?,
            end_time: row.get(11)?,
            created_at: parse_datetime(&row.get::<_, String>(12)?),
            updated_at: parse_datetime(&row.get::<_, String>(13)?),
        },
        detail: None,
    })
}

const RECORD_SELECT: &str = "SELECT r.id, r.user_id, r.section_id, r.shift_id, r.created_at,
        u.username,
        sec.name, sec.created_at, sec.updated_at,
        sh.name, sh.start_time, sh.end_time, sh.created_at, sh.updated_at
 FROM records r
 JOIN users u ON u.id = r.user_id
 JOIN sections sec ON sec.id = r.section_id
 JOIN shifts sh ON sh.id = r.shift_id";

fn get_record_detail(conn: &Connection, record_id: &str) -> Result<Option<RecordDetail>> {
    let ccs = conn
        .query_row(
            "SELECT baf_in, baf_out, crm_in, crm_out, shipped_out, tugger_in, tugger_off,
                    total_trucks_in, total_trucks_out, total_movements, total_trucks, hook,
                    down_time, moved_of_shipping, slitter_on, slitter_off, coils_hatted, issues
             FROM ccs_record_details WHERE record_id = ?1",
            params![record_id],
            |row| {
                Ok(CcsDetails {
                    baf_in: row.get(0)?,
                    baf_out: row.get(1)?,
                    crm_in: row.get(2)?,
                    crm_out: row.get(3)?,
                    shipped_out: row.get(4)?,
                    tugger_in: row.get(5)?,
                    tugger_off: row.get(6)?,
                    total_trucks_in: row.get(7)?,
                    total_trucks_out: row.get(8)?,
                    total_movements: row.get(9)?,
                    total_trucks: row.get(10)?,
                    hook: row.get(11)?,
                    down_time: row.get(12)?,
                    moved_of_shipping: row.get(13)?,
                    slitter_on: row.get(14)?,
                    slitter_off: row.get(15)?,
                    coils_hatted: row.get(16)?,
                    issues: row.get(17)?,
                })
            },
        )
        .optional()?;
    if let Some(details) = ccs {
        return Ok(Some(RecordDetail::Ccs(details)));
    }

    let baf = conn
        .query_row(
            "SELECT production_count, defect_count, machine_downtime, notes
             FROM baf_record_details WHERE record_id = ?1",
            params![record_id],
            |row| {
                Ok(BafDetails {
                    production_count: row.get(0)?,
                    defect_count: row.get(1)?,
                    machine_downtime: row.get(2)?,
                    notes: row.get(3)?,
                })
            },
        )
        .optional()?;
    if let Some(details) = baf {
        return Ok(Some(RecordDetail::Baf(details)));
    }

    let slitter = conn
        .query_row(
            "SELECT coils_processed, total_weight, scrap_weight, blade_changes, remarks
             FROM slitter_record_details WHERE record_id = ?1",
            params![record_id],
            |row| {
                Ok(SlitterDetails {
                    coils_processed: row.get(0)?,
                    total_weight: row.get(1)?,
                    scrap_weight: row.get(2)?,
                    blade_changes: row.get(3)?,
                    remarks: row.get(4)?,
                })
            },
        )
        .optional()?;

    Ok(slitter.map(RecordDetail::Slitter))
}

fn insert_record_detail(conn: &Connection, record_id: &str, detail: &RecordDetail) -> Result<()> {
    let detail_id = uuid::Uuid::new_v4().to_string();
    match detail {
        RecordDetail::Ccs(d) => {
            conn.execute(
                "INSERT INTO ccs_record_details (id, record_id, baf_in, baf_out, crm_in, crm_out,
                     shipped_out, tugger_in, tugger_off, total_trucks_in, total_trucks_out,
                     total_movements, total_trucks, hook, down_time, moved_of_shipping,
                     slitter_on, slitter_off, coils_hatted, issues)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
                params![
                    detail_id,
                    record_id,
                    d.baf_in,
                    d.baf_out,
                    d.crm_in,
                    d.crm_out,
                    d.shipped_out,
                    d.tugger_in,
                    d.tugger_off,
                    d.total_trucks_in,
                    d.total_trucks_out,
                    d.total_movements,
                    d.total_trucks,
                    d.hook,
                    d.down_time,
                    d.moved_of_shipping,
                    d.slitter_on,
                    d.slitter_off,
                    d.coils_hatted,
                    d.issues,
                ],
            )
            .map_err(map_insert_error)?;
        }
        RecordDetail::Baf(d) => {
            conn.execute(
                "INSERT INTO baf_record_details (id, record_id, production_count, defect_count,
                     machine_downtime, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    detail_id,
                    record_id,
                    d.production_count,
                    d.defect_count,
                    d.machine_downtime,
                    d.notes,
                ],
            )
            .map_err(map_insert_error)?;
        }
        RecordDetail::Slitter(d) => {
            conn.execute(
                "INSERT INTO slitter_record_details (id, record_id, coils_processed, total_weight,
                     scrap_weight, blade_changes, remarks)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    detail_id,
                    record_id,
                    d.coils_processed,
                    d.total_weight,
                    d.scrap_weight,
                    d.blade_changes,
                    d.remarks,
                ],
            )
            .map_err(map_insert_error)?;
        }
    }
    Ok(())
}

fn delete_record_details(conn: &Connection, record_id: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM ccs_record_details WHERE record_id = ?1",
        params![record_id],
    )?;
    conn.execute(
        "DELETE FROM baf_record_details WHERE record_id = ?1",
        params![record_id],
    )?;
    conn.execute(
        "DELETE FROM slitter_record_details WHERE record_id = ?1",
        params![record_id],
    )?;
    Ok(())
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Role operations

    fn create_role(&self, role: &Role) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO roles (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![role.id, role.name, format_datetime(&role.created_at)],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    fn get_role(&self, id: &str) -> Result<Option<Role>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at FROM roles WHERE id = ?1",
            params![id],
            |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at FROM roles WHERE name = ?1",
            params![name],
            |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_roles(&self) -> Result<Vec<Role>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM roles ORDER BY name")?;

        let rows = stmt.query_map([], |row| {
            Ok(Role {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Section operations

    fn create_section(&self, section: &Section) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO sections (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    section.id,
                    section.name,
                    format_datetime(&section.created_at),
                    format_datetime(&section.updated_at),
                ],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    fn get_section(&self, id: &str) -> Result<Option<Section>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM sections WHERE id = ?1",
            params![id],
            section_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_section_by_name(&self, name: &str) -> Result<Option<Section>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM sections WHERE name = ?1",
            params![name],
            section_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_sections(&self) -> Result<Vec<Section>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM sections ORDER BY name")?;

        let rows = stmt.query_map([], section_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_section(&self, section: &Section) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE sections SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![
                    section.name,
                    format_datetime(&section.updated_at),
                    section.id
                ],
            )
            .map_err(map_insert_error)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_section(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sections WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Shift operations

    fn create_shift(&self, shift: &Shift) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO shifts (id, name, start_time, end_time, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    shift.id,
                    shift.name,
                    shift.start_time,
                    shift.end_time,
                    format_datetime(&shift.created_at),
                    format_datetime(&shift.updated_at),
                ],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    fn get_shift(&self, id: &str) -> Result<Option<Shift>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, start_time, end_time, created_at, updated_at
             FROM shifts WHERE id = ?1",
            params![id],
            shift_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_shifts(&self) -> Result<Vec<Shift>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, start_time, end_time, created_at, updated_at
             FROM shifts ORDER BY start_time",
        )?;

        let rows = stmt.query_map([], shift_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_shift(&self, shift: &Shift) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE shifts SET name = ?1, start_time = ?2, end_time = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    shift.name,
                    shift.start_time,
                    shift.end_time,
                    format_datetime(&shift.updated_at),
                    shift.id,
                ],
            )
            .map_err(map_insert_error)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_shift(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM shifts WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, username, password_hash, role_id, section_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id,
                    user.username,
                    user.password_hash,
                    user.role_id,
                    user.section_id,
                    format_datetime(&user.created_at),
                    format_datetime(&user.updated_at),
                ],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password_hash, role_id, section_id, created_at, updated_at
             FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password_hash, role_id, section_id, created_at, updated_at
             FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, role_id, section_id, created_at, updated_at
             FROM users ORDER BY username",
        )?;

        let rows = stmt.query_map([], user_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE users SET username = ?1, password_hash = ?2, role_id = ?3,
                     section_id = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    user.username,
                    user.password_hash,
                    user.role_id,
                    user.section_id,
                    format_datetime(&user.updated_at),
                    user.id,
                ],
            )
            .map_err(map_insert_error)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Record operations

    fn create_record(&self, record: &Record, detail: Option<&RecordDetail>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO records (id, user_id, section_id, shift_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.user_id,
                record.section_id,
                record.shift_id,
                format_datetime(&record.created_at),
            ],
        )
        .map_err(map_insert_error)?;

        if let Some(detail) = detail {
            insert_record_detail(&tx, &record.id, detail)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_record(&self, id: &str) -> Result<Option<RecordWithRelations>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                &format!("{RECORD_SELECT} WHERE r.id = ?1"),
                params![id],
                record_with_relations_from_row,
            )
            .optional()?;

        match row {
            Some(mut record) => {
                record.detail = get_record_detail(&conn, &record.record.id)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn list_records(&self) -> Result<Vec<RecordWithRelations>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{RECORD_SELECT} ORDER BY r.created_at DESC"))?;

        let rows = stmt.query_map([], record_with_relations_from_row)?;
        let mut records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);

        for record in &mut records {
            record.detail = get_record_detail(&conn, &record.record.id)?;
        }
        Ok(records)
    }

    fn list_user_records(&self, user_id: &str) -> Result<Vec<RecordWithRelations>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{RECORD_SELECT} WHERE r.user_id = ?1 ORDER BY r.created_at DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], record_with_relations_from_row)?;
        let mut records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);

        for record in &mut records {
            record.detail = get_record_detail(&conn, &record.record.id)?;
        }
        Ok(records)
    }

    fn update_record(&self, record: &Record, detail: Option<&RecordDetail>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE records SET user_id = ?1, section_id = ?2, shift_id = ?3 WHERE id = ?4",
            params![record.user_id, record.section_id, record.shift_id, record.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }

        // A provided detail replaces whatever detail row exists; None
        // leaves the stored detail untouched.
        if let Some(detail) = detail {
            delete_record_details(&tx, &record.id)?;
            insert_record_detail(&tx, &record.id, detail)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_record(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM records WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Session operations

    fn create_session(&self, session: &Session) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO sessions (id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    session.id,
                    session.token_hash,
                    session.token_lookup,
                    session.user_id,
                    format_datetime(&session.created_at),
                    session.expires_at.as_ref().map(format_datetime),
                    session.last_used_at.as_ref().map(format_datetime),
                ],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at
             FROM sessions WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
                    last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn delete_user_sessions(&self, user_id: &str) -> Result<()> {
        self.conn().execute(
            "DELETE FROM sessions WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    fn update_session_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE sessions SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
