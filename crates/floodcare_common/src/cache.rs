//! Persistent local cache of reports and announcements
//!
//! Two JSON records in the data directory, read once at boot and rewritten
//! after every store change. Timestamps are stored as RFC 3339 strings and
//! revived into `DateTime<Utc>` on read.

use crate::error::FloodError;
use crate::paths::{ANNOUNCEMENTS_FILE, REPORTS_FILE};
use crate::store::StoreObserver;
use crate::types::{Announcement, AnnouncementKind, Report};
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// JSON-file cache rooted at a data directory
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn reports_path(&self) -> PathBuf {
        self.dir.join(REPORTS_FILE)
    }

    fn announcements_path(&self) -> PathBuf {
        self.dir.join(ANNOUNCEMENTS_FILE)
    }

    /// Cached reports; empty when missing or unreadable
    pub fn load_reports(&self) -> Vec<Report> {
        read_record(&self.reports_path()).unwrap_or_default()
    }

    /// Cached announcements; the welcome seed when nothing was ever saved
    pub fn load_announcements(&self) -> Vec<Announcement> {
        match read_record(&self.announcements_path()) {
            Some(list) => list,
            None if !self.announcements_path().exists() => default_announcements(),
            None => Vec::new(),
        }
    }

    pub fn save_reports(&self, reports: &[Report]) -> Result<(), FloodError> {
        write_record(&self.reports_path(), reports)
    }

    pub fn save_announcements(&self, announcements: &[Announcement]) -> Result<(), FloodError> {
        write_record(&self.announcements_path(), announcements)
    }

    /// Remove both records
    pub fn clear_all(&self) -> Result<(), FloodError> {
        for path in [self.reports_path(), self.announcements_path()] {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl StoreObserver for LocalCache {
    fn reports_changed(&self, reports: &[Report]) {
        if let Err(e) = self.save_reports(reports) {
            error!("Failed to persist reports: {}", e);
        }
    }

    fn announcements_changed(&self, announcements: &[Announcement]) {
        if let Err(e) = self.save_announcements(announcements) {
            error!("Failed to persist announcements: {}", e);
        }
    }
}

/// The announcement shown before staff ever post one
pub fn default_announcements() -> Vec<Announcement> {
    vec![Announcement {
        id: "1".to_string(),
        title: "📢 แจ้งงดการเรียนการสอน".to_string(),
        content: "โรงเรียนหยุดทำการ 1 วัน เนื่องจากน้ำท่วมขังเส้นทางจราจร".to_string(),
        timestamp: Utc::now() - Duration::minutes(10),
        kind: AnnouncementKind::Warning,
    }]
}

/// None when the file is missing or does not parse
fn read_record<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Error parsing {}: {}", path.display(), e);
            None
        }
    }
}

fn write_record<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), FloodError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
