//! # ShiftTrack
//!
//! A shift-tracking server for manufacturing teams, usable both as a
//! standalone binary and as a library. Workers submit per-shift production
//! records organized by plant section, administrators manage users,
//! sections, and shifts, and a reporting surface aggregates records into
//! daily statistics.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! shifttrack = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shifttrack::server::{AppState, create_router};
//! use shifttrack::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/shifttrack.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState {
//!     store: Arc::new(store),
//! });
//! let router = create_router(state, &[]);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the client-surface CLI module. Disable with
//!   `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod server;
pub mod store;
pub mod types;
