//! Path helpers for FloodCare
//!
//! Priority for the data directory:
//! 1. $FLOODCARE_DATA_DIR (explicit override)
//! 2. $XDG_STATE_HOME/floodcare
//! 3. ~/.local/state/floodcare
//! 4. ./floodcare-data

use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "FLOODCARE_DATA_DIR";

/// File name of the cached report list
pub const REPORTS_FILE: &str = "reports.json";

/// File name of the cached announcement list
pub const ANNOUNCEMENTS_FILE: &str = "announcements.json";

/// File name of the persisted admin flag
pub const SESSION_FILE: &str = "admin_session";

pub fn default_data_dir() -> PathBuf {
    data_dir_from(
        std::env::var(DATA_DIR_ENV).ok(),
        std::env::var("XDG_STATE_HOME").ok(),
        dirs::home_dir(),
    )
}

/// Resolve the data directory from already-read environment values
pub fn data_dir_from(
    explicit: Option<String>,
    xdg_state: Option<String>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = explicit.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(xdg_state) = xdg_state.filter(|d| !d.is_empty()) {
        return PathBuf::from(xdg_state).join("floodcare");
    }

    home.map(|home| home.join(".local/state/floodcare"))
        .unwrap_or_else(|| PathBuf::from("floodcare-data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = data_dir_from(
            Some("/srv/floodcare".to_string()),
            Some("/state".to_string()),
            Some(PathBuf::from("/home/staff")),
        );
        assert_eq!(dir, PathBuf::from("/srv/floodcare"));
    }

    #[test]
    fn test_xdg_then_home_then_cwd() {
        let home = Some(PathBuf::from("/home/staff"));
        assert_eq!(
            data_dir_from(None, Some("/state".to_string()), home.clone()),
            PathBuf::from("/state/floodcare")
        );
        assert_eq!(
            data_dir_from(Some(String::new()), None, home),
            PathBuf::from("/home/staff/.local/state/floodcare")
        );
        assert_eq!(data_dir_from(None, None, None), PathBuf::from("floodcare-data"));
    }
}
