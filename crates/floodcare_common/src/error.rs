//! Error types for FloodCare.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloodError {
    /// Missing required input; the message is shown to the reporter as-is
    #[error("{0}")]
    Validation(String),

    #[error("Admin session required. Log in first.")]
    Unauthorized,

    #[error("Incorrect admin password")]
    WrongPassword,

    #[error("Remote sheet error: {0}")]
    Remote(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FloodError {
    /// HTTP status the service answers with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FloodError::Validation(_) => 400,
            FloodError::Unauthorized | FloodError::WrongPassword => 401,
            FloodError::Remote(_) | FloodError::Model(_) => 502,
            FloodError::Timeout(_) => 504,
            FloodError::Config(_) | FloodError::Io(_) | FloodError::Json(_) => 500,
        }
    }

    /// True for errors caused by what the caller sent rather than by the system
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
