//! Control surface
//!
//! JSON requests from the settings UI and the responses sent back.

use crate::settings::SettingsPatch;
use crate::stats::{DetailedStats, Summary};
use serde::{Deserialize, Serialize};

/// Request, tagged by `action`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlRequest {
    PageLoaded,
    UpdateSettings {
        settings: SettingsPatch,
    },
    GetStats,
    GetDetailedStats,
    ShowMore,
    #[serde(rename_all = "camelCase")]
    ScrollToMessage {
        message_id: String,
    },
}

/// Outcome of a scroll-to-message request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollOutcome {
    pub success: bool,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_hidden_count: Option<usize>,
}

impl ScrollOutcome {
    pub fn not_found() -> Self {
        Self {
            success: false,
            found: false,
            revealed_count: None,
            new_hidden_count: None,
        }
    }
}

/// Outcome of a show-more request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowMoreOutcome {
    pub success: bool,
    pub hidden: usize,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

/// Response body; serialized without a wrapper
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlResponse {
    Summary(Summary),
    Detailed(DetailedStats),
    Scroll(ScrollOutcome),
    ShowMore(ShowMoreOutcome),
    Ack(Ack),
}

impl ControlResponse {
    pub fn ack(success: bool) -> Self {
        Self::Ack(Ack { success })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requests() {
        let req: ControlRequest = serde_json::from_str(r#"{"action":"getStats"}"#).unwrap();
        assert_eq!(req, ControlRequest::GetStats);

        let req: ControlRequest = serde_json::from_str(
            r#"{"action":"scrollToMessage","messageId":"ai-optimizer-msg-3"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            ControlRequest::ScrollToMessage {
                message_id: "ai-optimizer-msg-3".into()
            }
        );

        let req: ControlRequest = serde_json::from_str(
            r#"{"action":"updateSettings","settings":{"maxMessages":20,"hideEmpty":false}}"#,
        )
        .unwrap();
        let ControlRequest::UpdateSettings { settings } = req else {
            panic!("wrong variant");
        };
        assert_eq!(settings.max_messages, Some(20));
        assert_eq!(settings.hide_empty, Some(false));

        assert!(serde_json::from_str::<ControlRequest>(r#"{"action":"reboot"}"#).is_err());
    }

    #[test]
    fn test_response_shapes() {
        let json = ControlResponse::ack(true).to_json().unwrap();
        assert_eq!(json, r#"{"success":true}"#);

        let json = ControlResponse::Scroll(ScrollOutcome::not_found()).to_json().unwrap();
        assert_eq!(json, r#"{"success":false,"found":false}"#);

        let json = ControlResponse::Scroll(ScrollOutcome {
            success: true,
            found: true,
            revealed_count: Some(4),
            new_hidden_count: Some(0),
        })
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"success":true,"found":true,"revealedCount":4,"newHiddenCount":0}"#);

        let json = ControlResponse::ShowMore(ShowMoreOutcome { success: true, hidden: 3 })
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"success":true,"hidden":3}"#);
    }
}
