//! Statistics reported to the settings UI

use crate::classifier::Classification;
use serde::{Deserialize, Serialize};

/// Platform name reported when no platform is active
pub const UNKNOWN_PLATFORM: &str = "Unknown";

/// Message counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub hidden: usize,
    pub visible: usize,
    pub platform: String,
}

impl Summary {
    pub fn new(total: usize, hidden: usize, platform: &str) -> Self {
        Self {
            total,
            hidden,
            visible: total.saturating_sub(hidden),
            platform: platform.to_string(),
        }
    }
}

/// One row of the detailed statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    /// 1-based position in the transcript
    pub index: usize,
    pub sender: String,
    pub is_user: bool,
    pub content: String,
    pub display_content: String,
    pub length: usize,
    pub message_id: String,
}

impl MessageSummary {
    pub fn from_classification(index: usize, c: Classification) -> Self {
        Self {
            index: index + 1,
            sender: c.sender_label,
            is_user: c.is_user,
            content: c.content,
            display_content: c.display_content,
            length: c.length,
            message_id: c.message_id,
        }
    }
}

/// Per-sender breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStats {
    pub total_user: usize,
    pub total_ai: usize,
    pub total_all: usize,
    pub messages: Vec<MessageSummary>,
    pub platform: String,
}

impl DetailedStats {
    pub fn empty(platform: &str) -> Self {
        Self {
            total_user: 0,
            total_ai: 0,
            total_all: 0,
            messages: Vec::new(),
            platform: platform.to_string(),
        }
    }

    pub fn from_messages(total: usize, messages: Vec<MessageSummary>, platform: &str) -> Self {
        let total_user = messages.iter().filter(|m| m.is_user).count();
        Self {
            total_user,
            total_ai: messages.len() - total_user,
            total_all: total,
            messages,
            platform: platform.to_string(),
        }
    }
}
