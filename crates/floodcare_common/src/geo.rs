//! Best-effort device geolocation
//!
//! A missing position never fails a flow: lookups that error or exceed the
//! soft timeout yield `None` and the reporter is asked to describe the
//! location in the message instead.

use crate::error::FloodError;
use crate::types::Coordinates;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Shown when no position could be attached
pub const LOCATION_ADVISORY: &str = "ไม่สามารถระบุตำแหน่งได้ กรุณาระบุในข้อความ";

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, FloodError>;
}

/// Position already known (typed in, or sent by the device)
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, FloodError> {
        Ok(self.0)
    }
}

/// Device without positioning
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn locate(&self) -> Result<Coordinates, FloodError> {
        Err(FloodError::Validation("geolocation is not available".to_string()))
    }
}

/// Runs a command that prints `{"latitude": .., "longitude": ..}`
///
/// `termux-location` on Android phones is the usual one.
#[derive(Debug, Clone)]
pub struct CommandLocation {
    program: String,
    args: Vec<String>,
}

impl CommandLocation {
    /// None for an empty command line
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self { program: program.clone(), args: args.to_vec() })
    }
}

#[async_trait]
impl LocationProvider for CommandLocation {
    async fn locate(&self) -> Result<Coordinates, FloodError> {
        debug!("Locating via {}", self.program);
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(FloodError::Validation(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let coords: Coordinates = serde_json::from_slice(&output.stdout)?;
        if !coords.latitude.is_finite() || !coords.longitude.is_finite() {
            return Err(FloodError::Validation("location is not a number".to_string()));
        }
        Ok(coords)
    }
}

/// Ask the provider, giving up after `timeout`
pub async fn locate_within(provider: &dyn LocationProvider, timeout: Duration) -> Option<Coordinates> {
    match tokio::time::timeout(timeout, provider.locate()).await {
        Ok(Ok(coords)) => Some(coords),
        Ok(Err(e)) => {
            warn!("Location failed: {}", e);
            None
        }
        Err(_) => {
            warn!("Location timed out after {}s", timeout.as_secs());
            None
        }
    }
}
