pub const SCHEMA: &str = r#"
-- Static reference data: SuperAdmin, Admin, User
CREATE TABLE IF NOT EXISTS roles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Plant areas with their own metrics forms (CCS, BAF, Slitter)
CREATE TABLE IF NOT EXISTS sections (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Recurring daily work periods; times are HH:MM:SS text
CREATE TABLE IF NOT EXISTS shifts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2id hash with embedded salt
    role_id TEXT NOT NULL REFERENCES roles(id),

    -- Section assignment is optional; SuperAdmin typically has none
    section_id TEXT REFERENCES sections(id) ON DELETE SET NULL,

    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- One row per submitted shift report
CREATE TABLE IF NOT EXISTS records (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    section_id TEXT NOT NULL REFERENCES sections(id),
    shift_id TEXT NOT NULL REFERENCES shifts(id),
    created_at TEXT DEFAULT (datetime('now'))
);

-- Section-specific detail rows, 1:1 with records. A record populates at
-- most the table matching its section.
CREATE TABLE IF NOT EXISTS ccs_record_details (
    id TEXT PRIMARY KEY,
    record_id TEXT NOT NULL UNIQUE REFERENCES records(id) ON DELETE CASCADE,
    baf_in INTEGER,
    baf_out INTEGER,
    crm_in INTEGER,
    crm_out INTEGER,
    shipped_out INTEGER,
    tugger_in INTEGER,
    tugger_off INTEGER,
    total_trucks_in INTEGER,
    total_trucks_out INTEGER,
    total_movements INTEGER,
    total_trucks INTEGER,
    hook INTEGER,
    down_time REAL,
    moved_of_shipping INTEGER,
    slitter_on INTEGER,
    slitter_off INTEGER,
    coils_hatted INTEGER,
    issues TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS baf_record_details (
    id TEXT PRIMARY KEY,
    record_id TEXT NOT NULL UNIQUE REFERENCES records(id) ON DELETE CASCADE,
    production_count INTEGER,
    defect_count INTEGER,
    machine_downtime REAL,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS slitter_record_details (
    id TEXT PRIMARY KEY,
    record_id TEXT NOT NULL UNIQUE REFERENCES records(id) ON DELETE CASCADE,
    coils_processed INTEGER,
    total_weight REAL,
    scrap_weight REAL,
    blade_changes INTEGER,
    remarks TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Sessions are bearer credentials issued at login
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- short prefix for fast lookup
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,                   -- NULL = never
    last_used_at TEXT
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_users_role ON users(role_id);
CREATE INDEX IF NOT EXISTS idx_users_section ON users(section_id);
CREATE INDEX IF NOT EXISTS idx_records_user ON records(user_id);
CREATE INDEX IF NOT EXISTS idx_records_section ON records(section_id);
CREATE INDEX IF NOT EXISTS idx_records_shift ON records(shift_id);
CREATE INDEX IF NOT EXISTS idx_records_created ON records(created_at);
CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_lookup ON sessions(token_lookup);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
"#;
