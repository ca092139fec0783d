//! Flood safety advice chat
//!
//! Thin wrapper over the model client. Never fails: a disabled or
//! unreachable model yields the fixed fallback line.

use crate::error::FloodError;
use crate::model_client::{ChatTurn, ModelClient};
use tracing::warn;

pub const ADVICE_FALLBACK: &str = "Network error. Please stay safe and try again.";

const ADVICE_SYSTEM_PROMPT: &str = "You are a helpful flood safety assistant for students in Pattani. \
Keep answers short, encouraging, and practical. Prioritize safety instructions. \
If asked about evacuation, tell them to wait for official school boats unless in immediate danger.";

/// Reject an empty question before it costs a model call
pub fn check_question(message: &str) -> Result<(), FloodError> {
    if message.trim().is_empty() {
        return Err(FloodError::Validation("message is empty".to_string()));
    }
    Ok(())
}

pub async fn advise(client: &ModelClient, history: &[ChatTurn], message: &str) -> String {
    let mut turns = history.to_vec();
    turns.push(ChatTurn::user(message.trim()));

    match client.complete_text(ADVICE_SYSTEM_PROMPT, &turns).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Advice chat failed: {}", e);
            ADVICE_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;

    #[tokio::test]
    async fn test_disabled_model_falls_back() {
        let client = ModelClient::new(ClassifierConfig::default()).unwrap();
        let reply = advise(&client, &[ChatTurn::model("สวัสดี")], "น้ำขึ้นแล้วทำอย่างไร").await;
        assert_eq!(reply, ADVICE_FALLBACK);
    }

    #[tokio::test]
    async fn test_unreachable_model_falls_back() {
        let client = ModelClient::new(ClassifierConfig {
            enabled: true,
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(advise(&client, &[], "hello").await, ADVICE_FALLBACK);
    }

    #[test]
    fn test_blank_question_rejected() {
        assert!(check_question("  ").is_err());
        assert!(check_question("boats?").is_ok());
    }
}
