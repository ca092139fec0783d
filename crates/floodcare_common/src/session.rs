//! Admin session gate
//!
//! One shared password from config, compared as-is. A successful login
//! leaves a flag file in the data directory; the dashboard stays unlocked
//! until logout removes it or the data directory is cleared. There is no
//! per-user identity and no expiry.

use crate::error::FloodError;
use crate::paths::SESSION_FILE;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const FLAG_VALUE: &str = "true";

#[derive(Debug, Clone)]
pub struct AdminSession {
    secret: String,
    flag_path: PathBuf,
}

impl AdminSession {
    pub fn new(secret: &str, data_dir: &Path) -> Self {
        Self {
            secret: secret.to_string(),
            flag_path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        fs::read_to_string(&self.flag_path)
            .map(|s| s.trim() == FLAG_VALUE)
            .unwrap_or(false)
    }

    pub fn login(&self, password: &str) -> Result<(), FloodError> {
        if password != self.secret {
            warn!("Rejected admin login attempt");
            return Err(FloodError::WrongPassword);
        }

        if let Some(parent) = self.flag_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.flag_path, FLAG_VALUE)?;
        info!("Admin session opened");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), FloodError> {
        match fs::remove_file(&self.flag_path) {
            Ok(()) => {
                info!("Admin session closed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Err(Unauthorized) unless logged in
    pub fn require(&self) -> Result<(), FloodError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(FloodError::Unauthorized)
        }
    }
}
