//! JSON schemas for the floodcared API

use crate::classifier::AssessmentSource;
use crate::intake::QuickStatus;
use crate::merge::{MergePolicy, SyncOutcome};
use crate::model_client::ChatTurn;
use crate::sync::SyncState;
use crate::types::{Announcement, AnnouncementKind, Coordinates, Report};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub reports: usize,
    pub unresolved: usize,
    pub announcements: usize,
    pub sync_state: SyncState,
    pub merge_policy: MergePolicy,
    /// False when no sheet endpoint is configured
    pub remote_configured: bool,
    pub model_enabled: bool,
}

/// Created report, with how its risk was decided
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub report: Report,
    pub source: AssessmentSource,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Request for a one-tap status report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickReportRequest {
    pub status: QuickStatus,
    pub name: String,
    pub phone: String,
}

/// Request for an SOS signal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SosRequest {
    /// Position known to the caller; otherwise the service tries its locator
    #[serde(default)]
    pub location: Option<Coordinates>,
}

/// SOS result; `advisory` is set when no position could be attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SosResponse {
    pub report: Report,
    #[serde(default)]
    pub advisory: Option<String>,
}

/// Admin priority queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    pub reports: Vec<Report>,
    pub unresolved: usize,
}

/// Result of resolve/delete; false means the id was unknown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeResponse {
    pub id: String,
    pub changed: bool,
}

/// Request to post an announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: AnnouncementKind,
}

fn default_kind() -> AnnouncementKind {
    AnnouncementKind::Info
}

/// Announcement list, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementsResponse {
    pub announcements: Vec<Announcement>,
}

/// Admin login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Admin session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub authenticated: bool,
}

/// Result of an on-demand sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    #[serde(flatten)]
    pub outcome: SyncOutcome,
    pub reports: usize,
}

/// Advice chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceRequest {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub message: String,
}

/// Advice chat reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub reply: String,
}

/// Body of every non-2xx answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
