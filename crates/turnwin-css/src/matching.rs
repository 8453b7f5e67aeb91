//! Selector matching against a live document
//!
//! Complex selectors are matched right to left. The descendant and
//! subsequent-sibling combinators backtrack over every candidate, which is
//! cheap for the shallow chat transcripts this runs on.

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, RelativeSelector,
    SelectorComponent, SelectorList,
};
use turnwin_dom::{Document, NodeId};

/// Check whether `node` matches any selector in the list
pub fn matches_list(doc: &Document, node: NodeId, list: &SelectorList) -> bool {
    doc.is_element(node) && list.selectors.iter().any(|sel| matches_complex(doc, node, sel, None))
}

/// Match a complex selector with `node` as subject. When `anchor` is set the
/// leftmost compound must stand in the given relation to the anchor element
/// (used by `:has()`).
fn matches_complex(
    doc: &Document,
    node: NodeId,
    selector: &ComplexSelector,
    anchor: Option<(Combinator, NodeId)>,
) -> bool {
    match selector.compounds.len() {
        0 => false,
        n => matches_from(doc, node, selector, n - 1, anchor),
    }
}

fn matches_from(
    doc: &Document,
    node: NodeId,
    selector: &ComplexSelector,
    idx: usize,
    anchor: Option<(Combinator, NodeId)>,
) -> bool {
    if !matches_compound(doc, node, &selector.compounds[idx]) {
        return false;
    }
    if idx == 0 {
        return match anchor {
            Some((combinator, anchor)) => related(doc, anchor, node, combinator),
            None => true,
        };
    }

    match selector.combinators[idx - 1] {
        Combinator::Child => doc
            .parent_element(node)
            .is_some_and(|p| matches_from(doc, p, selector, idx - 1, anchor)),
        Combinator::Descendant => element_ancestors(doc, node)
            .any(|a| matches_from(doc, a, selector, idx - 1, anchor)),
        Combinator::NextSibling => prev_element_sibling(doc, node)
            .is_some_and(|s| matches_from(doc, s, selector, idx - 1, anchor)),
        Combinator::Subsequent => prev_element_siblings(doc, node)
            .any(|s| matches_from(doc, s, selector, idx - 1, anchor)),
    }
}

/// Does `node` stand in `combinator` relation to `anchor`?
fn related(doc: &Document, anchor: NodeId, node: NodeId, combinator: Combinator) -> bool {
    match combinator {
        Combinator::Descendant => node != anchor && doc.tree().is_inclusive_ancestor(anchor, node),
        Combinator::Child => doc.parent(node) == Some(anchor),
        Combinator::NextSibling => prev_element_sibling(doc, node) == Some(anchor),
        Combinator::Subsequent => prev_element_siblings(doc, node).any(|s| s == anchor),
    }
}

fn matches_compound(doc: &Document, node: NodeId, compound: &CompoundSelector) -> bool {
    compound
        .components
        .iter()
        .all(|component| matches_component(doc, node, component))
}

fn matches_component(doc: &Document, node: NodeId, component: &SelectorComponent) -> bool {
    let Some(elem) = doc.tree().get(node).and_then(|n| n.as_element()) else {
        return false;
    };
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => elem.tag.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => elem.id() == Some(id.as_str()),
        SelectorComponent::Class(class) => elem.has_class(class),
        SelectorComponent::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
        SelectorComponent::PseudoClass(pseudo) => matches_pseudo(doc, node, pseudo),
    }
}

fn matches_pseudo(doc: &Document, node: NodeId, pseudo: &PseudoClass) -> bool {
    match pseudo {
        PseudoClass::Root => doc.parent(node) == Some(doc.root()),
        PseudoClass::Empty => doc.children(node).all(|c| {
            !doc.is_element(c)
                && doc
                    .tree()
                    .get(c)
                    .and_then(|n| n.as_text())
                    .is_none_or(str::is_empty)
        }),
        PseudoClass::FirstChild => sibling_position(doc, node).is_some_and(|(i, _)| i == 1),
        PseudoClass::LastChild => sibling_position(doc, node).is_some_and(|(i, n)| i == n),
        PseudoClass::OnlyChild => sibling_position(doc, node).is_some_and(|(_, n)| n == 1),
        PseudoClass::NthChild(expr) => {
            sibling_position(doc, node).is_some_and(|(i, _)| expr.matches(i as i32))
        }
        PseudoClass::NthLastChild(expr) => {
            sibling_position(doc, node).is_some_and(|(i, n)| expr.matches((n - i + 1) as i32))
        }
        PseudoClass::Not(list) => !matches_list(doc, node, list),
        PseudoClass::Is(list) | PseudoClass::Where(list) => matches_list(doc, node, list),
        PseudoClass::Has(relative) => relative.iter().any(|rel| matches_relative(doc, node, rel)),
    }
}

fn matches_relative(doc: &Document, anchor: NodeId, rel: &RelativeSelector) -> bool {
    let anchor_ctx = Some((rel.combinator, anchor));
    match rel.combinator {
        Combinator::Descendant | Combinator::Child => doc
            .descendants(anchor)
            .filter(|d| doc.is_element(*d))
            .any(|d| matches_complex(doc, d, &rel.selector, anchor_ctx)),
        Combinator::NextSibling | Combinator::Subsequent => {
            let Some(parent) = doc.parent(anchor) else {
                return false;
            };
            doc.descendants(parent)
                .filter(|d| doc.is_element(*d) && !doc.tree().is_inclusive_ancestor(anchor, *d))
                .any(|d| matches_complex(doc, d, &rel.selector, anchor_ctx))
        }
    }
}

fn element_ancestors(doc: &Document, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    doc.ancestors(node).filter(move |a| doc.is_element(*a))
}

fn prev_element_siblings(doc: &Document, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    let tree = doc.tree();
    let mut cursor = tree.get(node).map(|n| n.prev_sibling);
    std::iter::from_fn(move || {
        loop {
            let id = cursor.filter(|c| c.is_valid())?;
            let n = tree.get(id)?;
            cursor = Some(n.prev_sibling);
            if n.is_element() {
                return Some(id);
            }
        }
    })
}

fn prev_element_sibling(doc: &Document, node: NodeId) -> Option<NodeId> {
    prev_element_siblings(doc, node).next()
}

/// 1-based index among element siblings, and the sibling count
fn sibling_position(doc: &Document, node: NodeId) -> Option<(usize, usize)> {
    let parent = doc.parent(node)?;
    let mut index = None;
    let mut count = 0;
    for child in doc.element_children(parent) {
        count += 1;
        if child == node {
            index = Some(count);
        }
    }
    index.map(|i| (i, count))
}
