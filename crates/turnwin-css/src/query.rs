//! Element query methods
//!
//! querySelector, querySelectorAll, closest and matches over a document.

use crate::matching::matches_list;
use crate::SelectorList;
use turnwin_dom::{Document, NodeId};

/// Element query trait
pub trait ElementQuery {
    /// First element under `scope` (exclusive) matching the list
    fn query_selector(&self, scope: NodeId, selector: &SelectorList) -> Option<NodeId>;

    /// All elements under `scope` (exclusive) matching the list, in document
    /// order. Each element appears once even if several clauses match it.
    fn query_selector_all(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId>;

    /// Nearest inclusive ancestor matching the list
    fn closest(&self, element: NodeId, selector: &SelectorList) -> Option<NodeId>;

    /// Check if element matches the list
    fn matches(&self, element: NodeId, selector: &SelectorList) -> bool;

    /// Check if any strict descendant matches the list
    fn has_descendant(&self, element: NodeId, selector: &SelectorList) -> bool {
        self.query_selector(element, selector).is_some()
    }
}

impl ElementQuery for Document {
    fn query_selector(&self, scope: NodeId, selector: &SelectorList) -> Option<NodeId> {
        self.descendants(scope).find(|n| matches_list(self, *n, selector))
    }

    fn query_selector_all(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        // Preorder traversal visits each node once, so the result is already
        // deduplicated and in document order.
        self.descendants(scope)
            .filter(|n| matches_list(self, *n, selector))
            .collect()
    }

    fn closest(&self, element: NodeId, selector: &SelectorList) -> Option<NodeId> {
        std::iter::once(element)
            .chain(self.ancestors(element))
            .find(|n| matches_list(self, *n, selector))
    }

    fn matches(&self, element: NodeId, selector: &SelectorList) -> bool {
        matches_list(self, element, selector)
    }
}
