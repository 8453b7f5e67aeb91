//! turnwin DOM - host document model
//!
//! Arena-backed tree standing in for the page a chat site renders. The
//! visibility engine only annotates this tree (classes, attributes, inline
//! style); it never restructures it.

mod classlist;
mod document;
mod node;
mod observer;
mod style;
mod tree;

pub use classlist::ClassList;
pub use document::{Document, ScrollAlignment, ScrollRequest};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use observer::{MutationObserverInit, MutationObservers, MutationRecord, MutationType, ObserverId};
pub use style::InlineStyle;
pub use tree::{Ancestors, Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// DOM operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node not found")]
    NotFound,
    #[error("hierarchy request error")]
    HierarchyRequest,
    #[error("reference node is not a child of the parent")]
    NotAChild,
}
