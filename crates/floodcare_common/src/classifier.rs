//! Risk classifier for incoming reports.
//!
//! Two tiers behind one interface: a deterministic keyword matcher that can
//! never fail, and an optional external model. The model tier is bounded by a
//! timeout and degrades to `Medium` on any error so a submission is never
//! blocked by it.

use crate::error::FloodError;
use crate::model_client::ModelClient;
use crate::types::{Category, RiskLevel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Keywords that make a report life-threatening on their own
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "เจ็บ",       // pain / injury
    "เลือด",      // bleeding
    "หมดสติ",     // unconscious
    "ไฟดูด",      // electrocution
    "จมน้ำ",      // drowning
    "ติดอยู่",     // trapped
    "อพยพ",       // evacuate
    "ด่วนที่สุด",  // most urgent
];

/// Keywords that mark a report as needing help soon
pub const HIGH_KEYWORDS: &[&str] = &[
    "ท่วมสูง",    // deep flooding
    "ไฟดับ",      // power outage
    "ไม่มีอาหาร",  // no food
    "ป่วย",       // sick
    "ยาหมด",      // medicine depleted
];

/// Deterministic keyword classification. First matching tier wins.
pub fn classify(message: &str, category: Category) -> RiskLevel {
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| message.contains(k));

    if category == Category::Evacuation || contains_any(CRITICAL_KEYWORDS) {
        return RiskLevel::Critical;
    }
    if matches!(category, Category::Medical | Category::Food) || contains_any(HIGH_KEYWORDS) {
        return RiskLevel::High;
    }
    if category == Category::SafeCheckin {
        return RiskLevel::Low;
    }
    RiskLevel::Medium
}

/// Which tier produced an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentSource {
    Keyword,
    Model,
    /// Model tier failed or timed out
    Degraded,
}

/// Result of classifying one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub risk_level: RiskLevel,
    pub summary: Option<String>,
    pub source: AssessmentSource,
}

impl Assessment {
    fn degraded() -> Self {
        Self {
            risk_level: RiskLevel::Medium,
            summary: Some("Analysis failed, please review manually.".to_string()),
            source: AssessmentSource::Degraded,
        }
    }
}

/// Anything that can assign a risk level to a report. Never fails.
#[async_trait]
pub trait RiskClassifier: Send + Sync {
    async fn assess(&self, message: &str, category: Category) -> Assessment;
}

/// An external classifier that is allowed to fail
#[async_trait]
pub trait ExternalClassifier: Send + Sync {
    async fn classify(&self, message: &str, category: Category) -> Result<Assessment, FloodError>;
}

/// The keyword tier
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

#[async_trait]
impl RiskClassifier for KeywordClassifier {
    async fn assess(&self, message: &str, category: Category) -> Assessment {
        Assessment {
            risk_level: classify(message, category),
            summary: None,
            source: AssessmentSource::Keyword,
        }
    }
}

const TRIAGE_SYSTEM_PROMPT: &str = "You are a crisis management AI for a school in a flood zone. \
Analyze the student's report. \
Assign a riskLevel (SAFE, CAUTION, DANGER, CRITICAL). \
CRITICAL: Life threatening, rapid water rise, trapped, medical emergency. \
DANGER: High water, no food/water, power outage over 24h. \
CAUTION: Water nearby, supplies low. \
SAFE: Checking in, no immediate issues. \
Also provide a very short 5-word summary. \
Respond with JSON: {\"riskLevel\": \"...\", \"summary\": \"...\"}";

/// The external model tier
pub struct ModelClassifier {
    client: ModelClient,
}

impl ModelClassifier {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExternalClassifier for ModelClassifier {
    async fn classify(&self, message: &str, category: Category) -> Result<Assessment, FloodError> {
        let prompt = format!(
            "Student Report from Flood Zone (Pattani, Rusamilae): \"{}\". Category: {}",
            message, category
        );
        let json = self.client.complete_json(TRIAGE_SYSTEM_PROMPT, &prompt).await?;
        parse_model_assessment(&json)
    }
}

/// Read `{"riskLevel": ..., "summary": ...}` from a model answer
pub fn parse_model_assessment(json: &serde_json::Value) -> Result<Assessment, FloodError> {
    let risk_level = json
        .get("riskLevel")
        .and_then(|v| v.as_str())
        .ok_or_else(|| FloodError::Model("answer has no riskLevel".to_string()))?
        .parse::<RiskLevel>()
        .map_err(FloodError::Model)?;

    let summary = json
        .get("summary")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(Assessment { risk_level, summary, source: AssessmentSource::Model })
}

/// Keyword tier, optionally fronted by an external model
pub struct TieredClassifier {
    external: Option<Arc<dyn ExternalClassifier>>,
    timeout: Duration,
}

impl TieredClassifier {
    /// Keyword tier only
    pub fn keyword_only() -> Self {
        Self { external: None, timeout: Duration::from_secs(0) }
    }

    pub fn with_external(external: Arc<dyn ExternalClassifier>, timeout: Duration) -> Self {
        Self { external: Some(external), timeout }
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }
}

#[async_trait]
impl RiskClassifier for TieredClassifier {
    async fn assess(&self, message: &str, category: Category) -> Assessment {
        let Some(external) = &self.external else {
            return KeywordClassifier.assess(message, category).await;
        };

        match tokio::time::timeout(self.timeout, external.classify(message, category)).await {
            Ok(Ok(assessment)) => {
                debug!("Model tier assessed report as {}", assessment.risk_level);
                assessment
            }
            Ok(Err(e)) => {
                warn!("AI triage failed, degrading to CAUTION: {}", e);
                Assessment::degraded()
            }
            Err(_) => {
                warn!(
                    "AI triage timed out after {}s, degrading to CAUTION",
                    self.timeout.as_secs()
                );
                Assessment::degraded()
            }
        }
    }
}
