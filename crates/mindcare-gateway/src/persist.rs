//! Session persistence
//!
//! Keeps the last signed-in session in a JSON file so the next launch can
//! pick it up through `current_session`.

use crate::auth::Session;
use crate::error::GatewayError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// JSON file holding at most one session
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session; a missing file means no session
    pub fn load(&self) -> Result<Option<Session>, GatewayError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the stored session
    pub fn save(&self, session: &Session) -> Result<(), GatewayError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Remove the stored session, if any
    pub fn clear(&self) -> Result<(), GatewayError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
