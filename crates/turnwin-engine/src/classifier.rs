//! Sender classification
//!
//! A fixed table of detectors is consulted in order; the first one with an
//! opinion decides. When none has one, position parity decides, which is
//! only right for strictly alternating transcripts.

use crate::platform::Platform;
use crate::{ID_ATTR, ID_PREFIX};
use serde::{Deserialize, Serialize};
use turnwin_css::{ElementQuery, SelectorList};
use turnwin_dom::{Document, NodeId};

/// Message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Label shown for the user's own messages
pub const USER_LABEL: &str = "You";

const DISPLAY_CHARS: usize = 100;

const USER_ALIGNMENT: &[&str] = &["items-end", "self-end", "justify-end"];
const ASSISTANT_ALIGNMENT: &[&str] = &["items-start", "self-start", "justify-start"];
const ASSISTANT_TOKENS: &[&str] = &["assistant", "bot", "ai"];
const USER_TOKENS: &[&str] = &["user", "me", "you"];
const ARIA_USER_TOKENS: &[&str] = &["user", "you", "me", "my message"];

/// Result of classifying one message
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub role: Role,
    pub is_user: bool,
    pub sender_label: String,
    pub content: String,
    pub display_content: String,
    /// Length of `content` in chars
    pub length: usize,
    pub message_id: String,
}

type RoleDetector = fn(&Document, NodeId, &Platform) -> Option<Role>;

const STRATEGIES: &[RoleDetector] = &[
    by_structural_marker,
    by_alignment,
    by_test_id,
    by_aria,
];

/// Classifies messages and hands out synthetic ids
#[derive(Debug, Default)]
pub struct MessageClassifier {
    next_id: u64,
}

impl MessageClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Role of the element at `index` in the located list
    pub fn role(doc: &Document, element: NodeId, index: usize, platform: &Platform) -> Role {
        STRATEGIES
            .iter()
            .find_map(|detect| detect(doc, element, platform))
            .unwrap_or(if index % 2 == 0 { Role::User } else { Role::Assistant })
    }

    /// Classify a message and make sure it carries a synthetic id.
    /// Returns `None` for detached elements.
    pub fn classify(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        index: usize,
        platform: &Platform,
    ) -> Option<Classification> {
        if !doc.is_connected(element) || !doc.is_element(element) {
            return None;
        }

        let message_id = self.ensure_id(doc, element);
        let role = Self::role(doc, element, index, platform);
        let content = doc.text_content(element).trim().to_string();
        let length = content.chars().count();
        let display_content = if length > DISPLAY_CHARS {
            let head: String = content.chars().take(DISPLAY_CHARS).collect();
            format!("{head}...")
        } else {
            content.clone()
        };

        Some(Classification {
            role,
            is_user: role == Role::User,
            sender_label: match role {
                Role::User => USER_LABEL.to_string(),
                Role::Assistant => platform.assistant_label.to_string(),
            },
            content,
            display_content,
            length,
            message_id,
        })
    }

    fn ensure_id(&mut self, doc: &mut Document, element: NodeId) -> String {
        if let Some(existing) = doc.attribute(element, ID_ATTR) {
            return existing.to_string();
        }
        let id = format!("{ID_PREFIX}{}", self.next_id);
        self.next_id += 1;
        doc.set_attribute(element, ID_ATTR, &id);
        id
    }
}

/// Element, one of its descendants, or one of its ancestors matches
fn marked(doc: &Document, element: NodeId, markers: Option<&SelectorList>) -> bool {
    markers.is_some_and(|m| doc.closest(element, m).is_some() || doc.has_descendant(element, m))
}

fn by_structural_marker(doc: &Document, element: NodeId, platform: &Platform) -> Option<Role> {
    let selectors = &platform.selectors;
    if marked(doc, element, selectors.user_markers.as_ref()) {
        Some(Role::User)
    } else if marked(doc, element, selectors.assistant_markers.as_ref()) {
        Some(Role::Assistant)
    } else {
        None
    }
}

fn by_alignment(doc: &Document, element: NodeId, _: &Platform) -> Option<Role> {
    std::iter::once(element)
        .chain(doc.ancestors(element).filter(|a| doc.is_element(*a)))
        .take(3)
        .find_map(|node| {
            let classes = doc.attribute(node, "class")?;
            if USER_ALIGNMENT.iter().any(|t| classes.contains(t)) {
                Some(Role::User)
            } else if ASSISTANT_ALIGNMENT.iter().any(|t| classes.contains(t)) {
                Some(Role::Assistant)
            } else {
                None
            }
        })
}

fn by_test_id(doc: &Document, element: NodeId, platform: &Platform) -> Option<Role> {
    let text = labelled_text(doc, element, &["data-testid"]);
    tokens_role(&text, platform, USER_TOKENS)
}

fn by_aria(doc: &Document, element: NodeId, platform: &Platform) -> Option<Role> {
    let text = labelled_text(doc, element, &["aria-label", "aria-roledescription"]);
    tokens_role(&text, platform, ARIA_USER_TOKENS)
}

/// Values of `attrs` on the element and on the nearest ancestor carrying
/// each attribute, lowercased and joined
fn labelled_text(doc: &Document, element: NodeId, attrs: &[&str]) -> String {
    let mut parts = Vec::new();
    for attr in attrs {
        if let Some(own) = doc.attribute(element, attr) {
            parts.push(own);
        }
    }
    for attr in attrs {
        if let Some(inherited) = doc.ancestors(element).find_map(|a| doc.attribute(a, attr)) {
            parts.push(inherited);
        }
    }
    parts.join(" ").to_lowercase()
}

fn tokens_role(text: &str, platform: &Platform, user_tokens: &[&str]) -> Option<Role> {
    if text.is_empty() {
        return None;
    }
    if ASSISTANT_TOKENS.iter().any(|t| text.contains(t)) || text.contains(platform.id.as_str()) {
        Some(Role::Assistant)
    } else if user_tokens.iter().any(|t| text.contains(t)) {
        Some(Role::User)
    } else {
        None
    }
}
