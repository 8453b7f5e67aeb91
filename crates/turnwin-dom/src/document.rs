//! Document - high-level document API
//!
//! All mutations go through here so that registered mutation observers see
//! them. Every mutating call tolerates stale ids and reports whether it
//! changed anything instead of failing.

use crate::observer::{MutationObserverInit, MutationObservers, MutationRecord, ObserverId};
use crate::{ClassList, DomError, DomTree, InlineStyle, Node, NodeId};

/// Vertical alignment requested by `scroll_into_view`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlignment {
    Start,
    Center,
    End,
    Nearest,
}

/// Last scroll request issued against the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: NodeId,
    pub alignment: ScrollAlignment,
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    observers: MutationObservers,
    last_scroll: Option<ScrollRequest>,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        let root = doc.root();
        // Fresh nodes under a fresh root cannot violate the hierarchy
        let _ = doc.append_child(root, html);
        let _ = doc.append_child(html, head);
        let _ = doc.append_child(html, body);
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            observers: MutationObservers::default(),
            last_scroll: None,
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Read-only tree access
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    // === Location ===

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Change the URL without reloading (history navigation)
    pub fn set_url(&mut self, url: &str) {
        if self.url != url {
            tracing::debug!(from = %self.url, to = %url, "document url changed");
            self.url = url.to_string();
        }
    }

    /// Host of the current URL, lowercased. Empty when the URL has none.
    pub fn hostname(&self) -> String {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .unwrap_or_default()
    }

    // === Construction ===

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.alloc(Node::element(tag))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.alloc(Node::text(text))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.tree.alloc(Node::comment(text))
    }

    // === Tree mutation ===

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let old_parent = self.tree.parent(child);
        self.tree.insert_before(parent, child, reference)?;
        if let Some(old) = old_parent {
            self.observers
                .notify(&self.tree, MutationRecord::child_list(old, Vec::new(), vec![child]));
        }
        self.observers
            .notify(&self.tree, MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    /// Detach a node from its parent. Returns false if it was already detached.
    pub fn remove(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.tree.parent(node) else {
            return false;
        };
        self.tree.detach(node);
        self.observers
            .notify(&self.tree, MutationRecord::child_list(parent, Vec::new(), vec![node]));
        true
    }

    /// Replace the children of an element (or the data of a text node) with text
    pub fn set_text(&mut self, node: NodeId, text: &str) -> bool {
        let Some(n) = self.tree.get_mut(node) else {
            return false;
        };
        if let crate::NodeData::Text(content) = &mut n.data {
            let old = std::mem::replace(content, text.to_string());
            self.observers
                .notify(&self.tree, MutationRecord::character_data(node, Some(old)));
            return true;
        }
        if !n.is_element() {
            return false;
        }

        let children: Vec<_> = self.tree.children(node).collect();
        for child in &children {
            self.tree.detach(*child);
        }
        let mut added = Vec::new();
        if !text.is_empty() {
            let text_node = self.create_text(text);
            if self.tree.append_child(node, text_node).is_ok() {
                added.push(text_node);
            }
        }
        self.observers
            .notify(&self.tree, MutationRecord::child_list(node, added, children));
        true
    }

    // === Attributes ===

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tree.get(node)?.as_element().map(|e| e.tag.as_str())
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.tree.get(node).is_some_and(Node::is_element)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.get(node)?.as_element()?.get_attr(name)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Set an attribute. Returns true if the stored value changed.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(elem) = self.tree.get_mut(node).and_then(Node::as_element_mut) else {
            return false;
        };
        if elem.get_attr(name) == Some(value) {
            return false;
        }
        let old = elem.set_attr(name, value);
        self.observers
            .notify(&self.tree, MutationRecord::attribute(node, name, old));
        true
    }

    /// Remove an attribute. Returns true if it was present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        let Some(elem) = self.tree.get_mut(node).and_then(Node::as_element_mut) else {
            return false;
        };
        match elem.remove_attr(name) {
            Some(old) => {
                self.observers
                    .notify(&self.tree, MutationRecord::attribute(node, name, Some(old)));
                true
            }
            None => false,
        }
    }

    // === Classes ===

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree
            .get(node)
            .and_then(Node::as_element)
            .is_some_and(|e| e.has_class(class))
    }

    pub fn class_list(&self, node: NodeId) -> ClassList {
        ClassList::from_string(self.attribute(node, "class").unwrap_or(""))
    }

    /// Add a class token. Returns true if it was added.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        if !self.is_element(node) {
            return false;
        }
        let mut list = self.class_list(node);
        if !list.add(class) {
            return false;
        }
        self.set_attribute(node, "class", &list.value())
    }

    /// Remove a class token. Returns true if it was present.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        let mut list = self.class_list(node);
        if !list.remove(class) {
            return false;
        }
        if list.is_empty() {
            self.remove_attribute(node, "class")
        } else {
            self.set_attribute(node, "class", &list.value())
        }
    }

    // === Inline style ===

    pub fn inline_style(&self, node: NodeId) -> InlineStyle {
        InlineStyle::parse(self.attribute(node, "style").unwrap_or(""))
    }

    pub fn style_property(&self, node: NodeId, property: &str) -> Option<String> {
        self.inline_style(node).get(property).map(str::to_string)
    }

    /// Set (or with an empty value, clear) one inline style property
    pub fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) -> bool {
        if !self.is_element(node) {
            return false;
        }
        let mut style = self.inline_style(node);
        style.set(property, value);
        if style.is_empty() {
            self.remove_attribute(node, "style")
        } else {
            self.set_attribute(node, "style", &style.to_css())
        }
    }

    // === Traversal ===

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.is_connected(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    /// Nearest ancestor that is an element
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.children(node)
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.children(node).filter(|c| self.is_element(*c))
    }

    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.ancestors(node)
    }

    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.descendants(node)
    }

    /// All connected elements in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.descendants(self.root()).filter(|n| self.is_element(*n))
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    /// First connected element with the given tag
    pub fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.elements()
            .find(|n| self.tag_name(*n).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.first_by_tag("html")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_by_tag("body")
    }

    pub fn main(&self) -> Option<NodeId> {
        self.first_by_tag("main")
    }

    /// Element whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements().find(|n| self.attribute(*n, "id") == Some(id))
    }

    // === Scrolling ===

    /// Ask the host to scroll a node into view. Detached nodes are ignored.
    pub fn scroll_into_view(&mut self, node: NodeId, alignment: ScrollAlignment) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        self.last_scroll = Some(ScrollRequest {
            target: node,
            alignment,
        });
        true
    }

    pub fn last_scroll(&self) -> Option<ScrollRequest> {
        self.last_scroll
    }

    // === Observers ===

    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.observers.observe(target, options)
    }

    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.disconnect(id)
    }

    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
