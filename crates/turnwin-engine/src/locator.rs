//! Message location
//!
//! Runs the platform's selector union as a single query, then drops
//! candidates that fail validation or touch a protected element.

use crate::platform::Platform;
use crate::validator::{is_valid_message, touches_protected};
use turnwin_css::ElementQuery;
use turnwin_dom::{Document, NodeId};

/// Valid messages in document order, oldest first
pub fn find_messages(doc: &Document, platform: &Platform) -> Vec<NodeId> {
    let selector = platform.locate_selector();
    if selector.is_empty() {
        tracing::debug!("{}: no message selectors", platform.display_name);
        return Vec::new();
    }

    let candidates = doc.query_selector_all(doc.root(), selector);
    let total = candidates.len();
    let protected = &platform.selectors.protected;
    let messages: Vec<_> = candidates
        .into_iter()
        .filter(|m| is_valid_message(doc, *m, platform))
        .filter(|m| !touches_protected(doc, *m, protected))
        .collect();

    tracing::debug!(
        "{}: {} valid messages from {} candidates",
        platform.display_name,
        messages.len(),
        total
    );
    messages
}

/// Element whose subtree holds the conversation.
///
/// The parent of the first container match, trying clauses in order, then
/// `<main>`, then `<body>`.
pub fn chat_container(doc: &Document, platform: &Platform) -> Option<NodeId> {
    platform
        .selectors
        .chat_container
        .iter()
        .find_map(|sel| doc.query_selector(doc.root(), sel).and_then(|c| doc.parent_element(c)))
        .or_else(|| doc.main())
        .or_else(|| doc.body())
}
