//! On-disk form drafts.
//!
//! Every answered form field is written through immediately, so an
//! interrupted submission can be resumed. A draft is removed only after
//! the server accepts the submission.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use super::credentials::project_dirs;

pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn open() -> anyhow::Result<Self> {
        Ok(Self {
            dir: project_dirs()?.data_dir().join("drafts"),
        })
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// One draft per (form kind, section, shift) triple.
    fn path(&self, kind: &str, section_id: &str, shift_id: &str) -> PathBuf {
        self.dir
            .join(format!("form-draft-{kind}-{section_id}-{shift_id}.json"))
    }

    pub fn save(
        &self,
        kind: &str,
        section_id: &str,
        shift_id: &str,
        value: &Value,
    ) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(kind, section_id, shift_id);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    pub fn load(&self, kind: &str, section_id: &str, shift_id: &str) -> anyhow::Result<Option<Value>> {
        let path = self.path(kind, section_id, shift_id);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn clear(&self, kind: &str, section_id: &str, shift_id: &str) -> anyhow::Result<()> {
        let path = self.path(kind, section_id, shift_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
