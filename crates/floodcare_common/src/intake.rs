//! Report intake - turns what a reporter typed into a classified Report
//!
//! Validation runs first and fails fast, before any classifier or network
//! work. Ids are the creation time in milliseconds; callers that hold the
//! store use [`next_free_id`] to step past a collision.

use crate::classifier::{classify, Assessment, RiskClassifier};
use crate::error::FloodError;
use crate::types::{Category, Coordinates, Report};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_DORMITORY: &str = "Unspecified";
pub const QUICK_DORMITORY: &str = "ไม่ระบุ";
pub const SOS_NAME: &str = "SOS SIGNAL";
pub const SOS_NO_FIX: &str = "GPS Failed";

const NAME_REQUIRED: &str = "กรุณาระบุชื่อ-สกุล";
const PHONE_REQUIRED: &str = "กรุณาระบุเบอร์โทรศัพท์";
const MESSAGE_REQUIRED: &str = "กรุณาระบุรายละเอียด";

/// A free-form report as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub dormitory: String,
    pub message: String,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

fn default_category() -> Category {
    Category::Other
}

fn require(value: &str, message: &str) -> Result<(), FloodError> {
    if value.trim().is_empty() {
        Err(FloodError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

impl ReportDraft {
    pub fn validate(&self) -> Result<(), FloodError> {
        require(&self.name, NAME_REQUIRED)?;
        require(&self.phone, PHONE_REQUIRED)?;
        require(&self.message, MESSAGE_REQUIRED)
    }
}

/// Id for a report created at `now`
pub fn report_id(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}

/// Validate, classify and assemble a draft
///
/// The assessment is returned alongside so callers can surface the model
/// summary or a degraded classification.
pub async fn build_report(
    draft: ReportDraft,
    classifier: &dyn RiskClassifier,
    now: DateTime<Utc>,
) -> Result<(Report, Assessment), FloodError> {
    draft.validate()?;

    let assessment = classifier.assess(&draft.message, draft.category).await;
    debug!(
        "Draft from {} classified {} via {:?}",
        draft.name.trim(),
        assessment.risk_level,
        assessment.source
    );

    let dormitory = match draft.dormitory.trim() {
        "" => DEFAULT_DORMITORY.to_string(),
        dorm => dorm.to_string(),
    };

    let report = Report {
        id: report_id(now),
        student_name: draft.name.trim().to_string(),
        phone_number: Some(draft.phone.trim().to_string()),
        dormitory,
        timestamp: now,
        location: draft.location,
        message: draft.message,
        category: draft.category,
        risk_level: assessment.risk_level,
        image_url: None,
        is_resolved: false,
    };
    Ok((report, assessment))
}

/// One-tap status check-ins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuickStatus {
    Safe,
    Anxious,
    Hungry,
}

impl QuickStatus {
    pub fn message(&self) -> &'static str {
        match self {
            QuickStatus::Safe => "รายงานตัว: ปลอดภัยดีครับ/ค่ะ",
            QuickStatus::Anxious => "รู้สึกกังวล/เครียด ต้องการคำปรึกษา",
            QuickStatus::Hungry => "ขาดแคลนอาหาร/น้ำดื่ม",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            QuickStatus::Safe => Category::SafeCheckin,
            QuickStatus::Anxious => Category::Other,
            QuickStatus::Hungry => Category::Food,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuickStatus::Safe => "SAFE",
            QuickStatus::Anxious => "ANXIOUS",
            QuickStatus::Hungry => "HUNGRY",
        }
    }
}

impl fmt::Display for QuickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuickStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Ok(QuickStatus::Safe),
            "ANXIOUS" => Ok(QuickStatus::Anxious),
            "HUNGRY" => Ok(QuickStatus::Hungry),
            other => Err(format!("unknown quick status: {}", other)),
        }
    }
}

/// Fixed-text check-in. Risk comes from the keyword tier so the three
/// buttons always land at LOW, MEDIUM and HIGH.
pub fn quick_report(
    status: QuickStatus,
    name: &str,
    phone: &str,
    now: DateTime<Utc>,
) -> Result<Report, FloodError> {
    require(name, NAME_REQUIRED)?;
    require(phone, PHONE_REQUIRED)?;

    let message = status.message();
    let category = status.category();
    Ok(Report {
        id: report_id(now),
        student_name: name.trim().to_string(),
        phone_number: Some(phone.trim().to_string()),
        dormitory: QUICK_DORMITORY.to_string(),
        timestamp: now,
        location: None,
        message: message.to_string(),
        category,
        risk_level: classify(message, category),
        image_url: None,
        is_resolved: false,
    })
}

/// Emergency signal with whatever position could be found
pub fn sos_report(location: Option<Coordinates>, now: DateTime<Utc>) -> Report {
    let (dormitory, link) = match &location {
        Some(c) => (
            format!("{:.4}, {:.4}", c.latitude, c.longitude),
            c.maps_link(),
        ),
        None => (SOS_NO_FIX.to_string(), "N/A".to_string()),
    };
    let message = format!("🚨 ขอความช่วยเหลือฉุกเฉิน (SOS BUTTON) \nพิกัด: {}", link);

    Report {
        id: report_id(now),
        student_name: SOS_NAME.to_string(),
        phone_number: None,
        dormitory,
        timestamp: now,
        location,
        risk_level: classify(&message, Category::Evacuation),
        message,
        category: Category::Evacuation,
        image_url: None,
        is_resolved: false,
    }
}

/// First millisecond id at or after `id` that `taken` rejects
///
/// Non-numeric ids are returned unchanged when free, otherwise suffixed.
pub fn next_free_id(id: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(id) {
        return id.to_string();
    }
    match id.parse::<i64>() {
        Ok(mut ms) => loop {
            ms += 1;
            let candidate = ms.to_string();
            if !taken(&candidate) {
                return candidate;
            }
        },
        Err(_) => (1u32..)
            .map(|n| format!("{}-{}", id, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| id.to_string()),
    }
}
