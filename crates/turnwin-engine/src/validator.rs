//! Message validation
//!
//! Decides whether a located candidate is a genuine conversation message
//! rather than a placeholder, an input widget or an empty shell.

use crate::platform::{Platform, ValidationPolicy};
use crate::{LOADING_TOKENS, MIN_MEANINGFUL_CHARS};
use turnwin_css::{ElementQuery, SelectorList};
use turnwin_dom::{Document, NodeId};

/// Is `text` (already trimmed) too short to mean anything?
pub fn is_trivial(text: &str) -> bool {
    text.chars().count() < MIN_MEANINGFUL_CHARS
}

/// Does the element carry no meaningful text?
pub fn is_empty(doc: &Document, element: NodeId) -> bool {
    is_trivial(doc.text_content(element).trim())
}

/// Exact, case-insensitive loading placeholder
pub fn is_loading_placeholder(text: &str) -> bool {
    LOADING_TOKENS.iter().any(|t| text.eq_ignore_ascii_case(t))
}

/// Does the text mention a loading state anywhere? Tokens are compared
/// without their trailing ellipsis.
pub fn mentions_loading(text: &str) -> bool {
    let lower = text.to_lowercase();
    LOADING_TOKENS
        .iter()
        .map(|t| t.trim_end_matches('.'))
        .filter(|stem| !stem.is_empty())
        .any(|stem| lower.contains(stem))
}

/// Element is, contains, or sits inside a protected match
pub fn touches_protected(doc: &Document, element: NodeId, protected: &SelectorList) -> bool {
    !protected.is_empty()
        && (doc.closest(element, protected).is_some() || doc.has_descendant(element, protected))
}

/// Validate a candidate under the platform's policy
pub fn is_valid_message(doc: &Document, element: NodeId, platform: &Platform) -> bool {
    if !doc.is_element(element) {
        return false;
    }
    match platform.validation {
        ValidationPolicy::Default => validate_default(doc, element, platform),
        ValidationPolicy::RoleContainer => validate_role_container(doc, element),
    }
}

fn validate_default(doc: &Document, element: NodeId, platform: &Platform) -> bool {
    if touches_protected(doc, element, &platform.selectors.protected) {
        return false;
    }

    let text = doc.text_content(element);
    let text = text.trim();
    // "..." clears the length threshold but is still a placeholder
    !text.is_empty() && !is_loading_placeholder(text)
}

fn validate_role_container(doc: &Document, element: NodeId) -> bool {
    let role = doc.attribute(element, "data-turn-role");
    let is_user = doc.has_class(element, "user-prompt-container") && role == Some("User");
    let is_model = doc.has_class(element, "model-prompt-container") && role == Some("Model");
    if !is_user && !is_model {
        return false;
    }

    let Some(content) = first_descendant(doc, element, |d, n| d.has_class(n, "turn-content")) else {
        return false;
    };
    let text = first_descendant(doc, content, |d, n| d.tag_name(n) == Some("ms-prompt-chunk"))
        .map(|chunk| doc.text_content(chunk))
        .unwrap_or_default();
    let text = text.trim();

    !is_trivial(text) && !mentions_loading(text)
}

fn first_descendant(
    doc: &Document,
    scope: NodeId,
    pred: impl Fn(&Document, NodeId) -> bool,
) -> Option<NodeId> {
    doc.descendants(scope).find(|n| pred(doc, *n))
}
