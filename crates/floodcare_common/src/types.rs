//! Core data types for reports and announcements
//!
//! Wire names follow the spreadsheet the school keeps as system of record:
//! risk levels travel as SAFE/CAUTION/DANGER/CRITICAL and record fields are
//! camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How urgently a report needs staff attention
///
/// Variant order is the triage order: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "SAFE")]
    Low,
    #[serde(rename = "CAUTION")]
    Medium,
    #[serde(rename = "DANGER")]
    High,
    #[serde(rename = "CRITICAL")]
    Critical,
}

impl RiskLevel {
    /// Numeric score used by the admin queue (1..=4)
    pub fn score(&self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
            RiskLevel::Critical => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "SAFE",
            RiskLevel::Medium => "CAUTION",
            RiskLevel::High => "DANGER",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    /// Accepts both the sheet names and the tier names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAFE" | "LOW" => Ok(RiskLevel::Low),
            "CAUTION" | "MEDIUM" => Ok(RiskLevel::Medium),
            "DANGER" | "HIGH" => Ok(RiskLevel::High),
            "CRITICAL" => Ok(RiskLevel::Critical),
            other => Err(format!("unknown risk level: {}", other)),
        }
    }
}

/// What the reporter says the report is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Food,
    Medical,
    Evacuation,
    Other,
    SafeCheckin,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Medical,
        Category::Evacuation,
        Category::Other,
        Category::SafeCheckin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "FOOD",
            Category::Medical => "MEDICAL",
            Category::Evacuation => "EVACUATION",
            Category::Other => "OTHER",
            Category::SafeCheckin => "SAFE_CHECKIN",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Severity of a school announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnouncementKind {
    Info,
    Warning,
    Emergency,
}

impl AnnouncementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementKind::Info => "INFO",
            AnnouncementKind::Warning => "WARNING",
            AnnouncementKind::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for AnnouncementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnouncementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INFO" => Ok(AnnouncementKind::Info),
            "WARNING" => Ok(AnnouncementKind::Warning),
            "EMERGENCY" => Ok(AnnouncementKind::Emergency),
            other => Err(format!("unknown announcement type: {}", other)),
        }
    }
}

/// Device position attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// "lat, lng" as written to the sheet
    pub fn to_sheet_string(&self) -> String {
        format!("{}, {}", self.latitude, self.longitude)
    }

    /// Parse the sheet's "lat, lng" form
    pub fn parse_pair(s: &str) -> Option<Self> {
        let (lat, lng) = s.split_once(',')?;
        let latitude = lat.trim().parse::<f64>().ok()?;
        let longitude = lng.trim().parse::<f64>().ok()?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        Some(Self { latitude, longitude })
    }

    pub fn maps_link(&self) -> String {
        format!("https://maps.google.com/?q={},{}", self.latitude, self.longitude)
    }
}

/// A student status or incident report
///
/// Immutable after creation except for `is_resolved`. The risk level is set
/// once by the classifier when the report is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub student_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub dormitory: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    pub message: String,
    pub category: Category,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_resolved: bool,
}

/// A broadcast from the school to everyone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
}

impl Announcement {
    pub fn new(title: &str, content: &str, kind: AnnouncementKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
            kind,
        }
    }
}
