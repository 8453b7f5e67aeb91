//! Edge case tests for turnwin-dom
//!
//! Stale ids, detached subtrees, observer delivery and inline style quirks.

use turnwin_dom::{DomError, Document, MutationObserverInit, MutationType, NodeId, ScrollAlignment};

fn page() -> (Document, NodeId) {
    let mut doc = Document::new("https://chatgpt.com/c/abc");
    let body = doc.body().unwrap();
    let list = doc.create_element("div");
    doc.append_child(body, list).unwrap();
    (doc, list)
}

// ============================================================================
// STALE AND DETACHED NODES
// ============================================================================

#[test]
fn test_stale_ids_are_harmless() {
    let (mut doc, _) = page();
    let bogus = NodeId::NONE;
    assert!(!doc.set_attribute(bogus, "a", "b"));
    assert!(!doc.remove_attribute(bogus, "a"));
    assert!(!doc.add_class(bogus, "x"));
    assert!(!doc.remove_class(bogus, "x"));
    assert!(!doc.set_text(bogus, "text"));
    assert!(!doc.set_style_property(bogus, "color", "red"));
    assert!(!doc.remove(bogus));
    assert!(!doc.is_connected(bogus));
    assert_eq!(doc.text_content(bogus), "");
    assert_eq!(doc.append_child(bogus, bogus), Err(DomError::NotFound));
}

#[test]
fn test_detached_subtree_keeps_resolving() {
    let (mut doc, list) = page();
    let item = doc.create_element("p");
    doc.append_child(list, item).unwrap();
    doc.set_text(item, "still here");

    assert!(doc.remove(list));
    assert!(!doc.remove(list));
    assert!(!doc.is_connected(item));
    assert_eq!(doc.text_content(item), "still here");
    assert!(doc.elements().all(|n| n != item));

    // Ids are never recycled
    let fresh = doc.create_element("p");
    assert_ne!(fresh, item);
    assert_ne!(fresh, list);
}

#[test]
fn test_hierarchy_errors() {
    let (mut doc, list) = page();
    let child = doc.create_element("span");
    doc.append_child(list, child).unwrap();

    assert_eq!(doc.append_child(child, list), Err(DomError::HierarchyRequest));
    assert_eq!(doc.append_child(list, list), Err(DomError::HierarchyRequest));
    assert_eq!(doc.append_child(list, doc.root()), Err(DomError::HierarchyRequest));

    let stranger = doc.create_element("b");
    assert_eq!(
        doc.insert_before(list, stranger, Some(doc.body().unwrap())),
        Err(DomError::NotAChild)
    );
}

#[test]
fn test_insert_before_orders_children() {
    let (mut doc, list) = page();
    let a = doc.create_element("a");
    let c = doc.create_element("c");
    doc.append_child(list, a).unwrap();
    doc.append_child(list, c).unwrap();
    let b = doc.create_element("b");
    doc.insert_before(list, b, Some(c)).unwrap();

    let tags: Vec<_> = doc
        .element_children(list)
        .filter_map(|n| doc.tag_name(n).map(str::to_string))
        .collect();
    assert_eq!(tags, ["a", "b", "c"]);

    // Moving an existing child relinks it
    doc.insert_before(list, c, Some(a)).unwrap();
    let first = doc.element_children(list).next();
    assert_eq!(first, Some(c));
}

// ============================================================================
// CLASSES AND ATTRIBUTES
// ============================================================================

#[test]
fn test_class_tokens_with_messy_whitespace() {
    let (mut doc, list) = page();
    doc.set_attribute(list, "class", "  flex\titems-end \n group ");
    assert!(doc.has_class(list, "items-end"));
    assert!(doc.has_class(list, "group"));
    assert!(!doc.has_class(list, "items"));

    assert!(!doc.add_class(list, "flex"));
    assert!(doc.remove_class(list, "flex"));
    assert!(doc.remove_class(list, "items-end"));
    assert!(doc.remove_class(list, "group"));
    // Last token gone, attribute gone
    assert!(!doc.has_attribute(list, "class"));
}

#[test]
fn test_set_same_attribute_value_is_a_no_op() {
    let (mut doc, list) = page();
    let obs = doc.observe(
        list,
        MutationObserverInit {
            attributes: true,
            ..Default::default()
        },
    );
    assert!(doc.set_attribute(list, "data-x", "1"));
    assert!(!doc.set_attribute(list, "data-x", "1"));
    assert_eq!(doc.take_records(obs).len(), 1);
}

#[test]
fn test_unicode_text_content() {
    let (mut doc, list) = page();
    for text in ["世界", "🚀 launch", "Привет", "مرحبا"] {
        doc.set_text(list, text);
        assert_eq!(doc.text_content(list), text);
    }
}

// ============================================================================
// INLINE STYLE
// ============================================================================

#[test]
fn test_style_property_round_trip() {
    let (mut doc, list) = page();
    doc.set_attribute(list, "style", "color: red;  BORDER : 1px solid black ;;");
    assert_eq!(doc.style_property(list, "color").as_deref(), Some("red"));
    assert_eq!(doc.style_property(list, "border").as_deref(), Some("1px solid black"));

    doc.set_style_property(list, "color", "");
    assert_eq!(doc.style_property(list, "color"), None);
    doc.set_style_property(list, "border", "");
    assert!(!doc.has_attribute(list, "style"));
}

#[test]
fn test_style_value_with_colon() {
    let (mut doc, list) = page();
    doc.set_attribute(list, "style", "background: url(http://x/y.png)");
    assert_eq!(
        doc.style_property(list, "background").as_deref(),
        Some("url(http://x/y.png)")
    );
}

// ============================================================================
// OBSERVERS
// ============================================================================

#[test]
fn test_subtree_observer_sees_deep_mutations() {
    let (mut doc, list) = page();
    let deep = doc.create_element("div");
    doc.append_child(list, deep).unwrap();

    let shallow = doc.observe(
        list,
        MutationObserverInit {
            child_list: true,
            ..Default::default()
        },
    );
    let subtree = doc.observe(
        list,
        MutationObserverInit {
            child_list: true,
            subtree: true,
            ..Default::default()
        },
    );

    let leaf = doc.create_element("p");
    doc.append_child(deep, leaf).unwrap();

    assert!(doc.take_records(shallow).is_empty());
    let records = doc.take_records(subtree);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mutation_type, MutationType::ChildList);
    assert_eq!(records[0].added_nodes, vec![leaf]);
    // Drained
    assert!(doc.take_records(subtree).is_empty());
}

#[test]
fn test_attribute_filter() {
    let (mut doc, list) = page();
    let obs = doc.observe(
        list,
        MutationObserverInit {
            attributes: true,
            attribute_filter: Some(vec!["class".into()]),
            ..Default::default()
        },
    );
    doc.set_attribute(list, "data-other", "x");
    doc.add_class(list, "hidden");
    let records = doc.take_records(obs);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].attribute_name.as_deref(), Some("class"));
    assert_eq!(records[0].old_value, None);
}

#[test]
fn test_disconnect_stops_delivery() {
    let (mut doc, list) = page();
    let obs = doc.observe(
        list,
        MutationObserverInit {
            child_list: true,
            ..Default::default()
        },
    );
    assert_eq!(doc.observer_count(), 1);
    assert!(doc.disconnect(obs));
    assert!(!doc.disconnect(obs));
    let p = doc.create_element("p");
    doc.append_child(list, p).unwrap();
    assert!(doc.take_records(obs).is_empty());
    assert_eq!(doc.observer_count(), 0);
}

// ============================================================================
// PAGE STATE
// ============================================================================

#[test]
fn test_hostname_from_url() {
    let mut doc = Document::new("https://aistudio.google.com/prompts/new_chat");
    assert_eq!(doc.hostname(), "aistudio.google.com");
    doc.set_url("not a url");
    assert_eq!(doc.hostname(), "");
}

#[test]
fn test_scroll_into_view_ignores_detached() {
    let (mut doc, list) = page();
    assert!(doc.scroll_into_view(list, ScrollAlignment::Center));
    assert_eq!(doc.last_scroll().map(|s| s.target), Some(list));

    let loose = doc.create_element("div");
    assert!(!doc.scroll_into_view(loose, ScrollAlignment::Center));
    assert_eq!(doc.last_scroll().map(|s| s.target), Some(list));
}
