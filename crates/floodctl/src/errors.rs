//! Error codes and exit status for floodctl

use thiserror::Error;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code for bad usage: unparsable arguments, missing fields, no session
pub const EXIT_USAGE: i32 = 64;

/// Exit code when the daemon answers with something that is not our JSON
pub const EXIT_INVALID_RESPONSE: i32 = 65;

/// Exit code when floodcared is unavailable/unreachable
pub const EXIT_DAEMON_UNAVAILABLE: i32 = 70;

#[derive(Debug, Error)]
pub enum CtlError {
    #[error("Cannot reach floodcared at {url}: {reason}\nIs the daemon running? Start it with: floodcared")]
    Unavailable { url: String, reason: String },

    /// The daemon refused the request; `message` is its `error` field
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from floodcared: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Input(String),
}

impl CtlError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CtlError::Unavailable { .. } => EXIT_DAEMON_UNAVAILABLE,
            CtlError::InvalidResponse(_) => EXIT_INVALID_RESPONSE,
            CtlError::Input(_) => EXIT_USAGE,
            CtlError::Api { status: 400..=499, .. } => EXIT_USAGE,
            CtlError::Api { .. } => EXIT_GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let down = CtlError::Unavailable { url: "http://x".into(), reason: "refused".into() };
        assert_eq!(down.exit_code(), EXIT_DAEMON_UNAVAILABLE);
        assert_eq!(CtlError::Api { status: 401, message: "no".into() }.exit_code(), EXIT_USAGE);
        assert_eq!(CtlError::Api { status: 502, message: "sheet".into() }.exit_code(), EXIT_GENERAL_ERROR);
        assert_eq!(CtlError::Input("bad".into()).exit_code(), EXIT_USAGE);
        assert_eq!(CtlError::InvalidResponse("html".into()).exit_code(), EXIT_INVALID_RESPONSE);
    }
}
