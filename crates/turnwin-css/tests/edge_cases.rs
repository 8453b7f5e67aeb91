//! Edge case tests for turnwin-css
//!
//! Selector forms lifted from real chat page markup, plus the marker
//! stylesheet.

use turnwin_css::{ElementQuery, SelectorError, SelectorList, marker_stylesheet, minify};
use turnwin_dom::{Document, NodeId};

fn sel(s: &str) -> SelectorList {
    SelectorList::parse(s).unwrap()
}

/// `<ul>` with `n` `<li data-i=..>` children
fn list(n: usize) -> (Document, NodeId, Vec<NodeId>) {
    let mut doc = Document::new("https://grok.com/");
    let body = doc.body().unwrap();
    let ul = doc.create_element("ul");
    doc.append_child(body, ul).unwrap();
    let items = (0..n)
        .map(|i| {
            let li = doc.create_element("li");
            doc.set_attribute(li, "data-i", &i.to_string());
            doc.append_child(ul, li).unwrap();
            li
        })
        .collect();
    (doc, ul, items)
}

// ============================================================================
// ATTRIBUTE OPERATORS
// ============================================================================

#[test]
fn test_attribute_operators() {
    let mut doc = Document::new("https://chatgpt.com/");
    let body = doc.body().unwrap();
    let el = doc.create_element("article");
    doc.append_child(body, el).unwrap();
    doc.set_attribute(el, "data-testid", "conversation-turn-12");
    doc.set_attribute(el, "class", "text-base group/turn");
    doc.set_attribute(el, "lang", "en-US");

    for (selector, expected) in [
        ("[data-testid]", true),
        (r#"[data-testid="conversation-turn-12"]"#, true),
        (r#"[data-testid^="conversation-turn"]"#, true),
        (r#"[data-testid$="-12"]"#, true),
        (r#"[data-testid*="turn"]"#, true),
        (r#"[data-testid*="TURN"]"#, false),
        (r#"[data-testid*="TURN" i]"#, true),
        (r#"[class~="group/turn"]"#, true),
        (r#"[class~="group"]"#, false),
        (r#"[lang|="en"]"#, true),
        (r#"[lang|="US"]"#, false),
        ("[data-missing]", false),
    ] {
        assert_eq!(doc.matches(el, &sel(selector)), expected, "{}", selector);
    }
}

#[test]
fn test_attribute_name_is_case_insensitive() {
    let mut doc = Document::new("https://claude.ai/");
    let body = doc.body().unwrap();
    let el = doc.create_element("div");
    doc.append_child(body, el).unwrap();
    doc.set_attribute(el, "data-testid", "user-message");
    assert!(doc.matches(el, &sel(r#"[DATA-TESTID="user-message"]"#)));
}

// ============================================================================
// STRUCTURAL PSEUDO-CLASSES
// ============================================================================

#[test]
fn test_nth_child_formulas() {
    let (doc, _, items) = list(7);
    let picked = |s: &str| -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, li)| doc.matches(**li, &sel(s)))
            .map(|(i, _)| i + 1)
            .collect()
    };
    assert_eq!(picked("li:nth-child(odd)"), [1, 3, 5, 7]);
    assert_eq!(picked("li:nth-child(even)"), [2, 4, 6]);
    assert_eq!(picked("li:nth-child(3)"), [3]);
    assert_eq!(picked("li:nth-child(3n+1)"), [1, 4, 7]);
    assert_eq!(picked("li:nth-child(-n+2)"), [1, 2]);
    assert_eq!(picked("li:nth-child(n+6)"), [6, 7]);
    assert_eq!(picked("li:nth-last-child(2)"), [6]);
    assert_eq!(picked("li:first-child"), [1]);
    assert_eq!(picked("li:last-child"), [7]);
    assert!(picked("li:only-child").is_empty());
}

#[test]
fn test_empty_and_root() {
    let (mut doc, ul, items) = list(2);
    doc.set_text(items[1], "x");
    assert!(doc.matches(items[0], &sel("li:empty")));
    assert!(!doc.matches(items[1], &sel(":empty")));
    assert!(!doc.matches(ul, &sel(":empty")));

    let html = doc.document_element().unwrap();
    assert!(doc.matches(html, &sel(":root")));
    assert!(!doc.matches(ul, &sel(":root")));
}

// ============================================================================
// COMBINATORS
// ============================================================================

#[test]
fn test_sibling_combinators() {
    let (doc, _, items) = list(4);
    let adjacent = doc.query_selector_all(doc.root(), &sel(r#"li[data-i="1"] + li"#));
    assert_eq!(adjacent, vec![items[2]]);
    let general = doc.query_selector_all(doc.root(), &sel(r#"li[data-i="1"] ~ li"#));
    assert_eq!(general, vec![items[2], items[3]]);
}

#[test]
fn test_descendant_backtracking() {
    // main > div.a > div.b > p : "main div.b p" must skip past div.a
    let mut doc = Document::new("https://grok.com/");
    let body = doc.body().unwrap();
    let main = doc.create_element("main");
    let a = doc.create_element("div");
    let b = doc.create_element("div");
    let p = doc.create_element("p");
    doc.set_attribute(a, "class", "a");
    doc.set_attribute(b, "class", "b");
    doc.append_child(body, main).unwrap();
    doc.append_child(main, a).unwrap();
    doc.append_child(a, b).unwrap();
    doc.append_child(b, p).unwrap();

    assert!(doc.matches(p, &sel("main div.b p")));
    assert!(doc.matches(p, &sel("main > div div > p")));
    assert!(!doc.matches(p, &sel("main > div.b p")));
    assert!(doc.matches(p, &sel("body main p")));
}

// ============================================================================
// LOGICAL PSEUDO-CLASSES
// ============================================================================

#[test]
fn test_has_child_versus_descendant() {
    let (mut doc, ul, items) = list(2);
    let b = doc.create_element("b");
    doc.append_child(items[0], b).unwrap();

    assert!(doc.matches(ul, &sel("ul:has(b)")));
    assert!(!doc.matches(ul, &sel("ul:has(> b)")));
    assert!(doc.matches(items[0], &sel("li:has(> b)")));
    assert!(doc.matches(ul, &sel("ul:has(> li:has(b))")));
}

#[test]
fn test_is_where_not_lists() {
    let (doc, _, items) = list(3);
    let both = sel(r#"li:is([data-i="0"], [data-i="2"])"#);
    let found = doc.query_selector_all(doc.root(), &both);
    assert_eq!(found, vec![items[0], items[2]]);

    let neither = sel(r#"li:not([data-i="0"], [data-i="2"])"#);
    assert_eq!(doc.query_selector_all(doc.root(), &neither), vec![items[1]]);

    let same = sel(r#"li:where([data-i="1"])"#);
    assert_eq!(doc.query_selector(doc.root(), &same), Some(items[1]));
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn test_union_of_overlapping_lists() {
    let (doc, _, items) = list(3);
    let union = SelectorList::union(&[sel("li"), sel(r#"[data-i="1"]"#), sel("ul > li")]);
    assert_eq!(union.len(), 3);
    assert_eq!(doc.query_selector_all(doc.root(), &union), items);
}

#[test]
fn test_query_scope_excludes_itself() {
    let (doc, ul, _) = list(1);
    assert_eq!(doc.query_selector(ul, &sel("ul")), None);
    assert_eq!(doc.closest(ul, &sel("ul")), Some(ul));
    assert!(!doc.has_descendant(ul, &sel("ul")));
}

#[test]
fn test_malformed_selectors() {
    assert_eq!(SelectorList::parse(""), Err(SelectorError::Empty));
    assert!(SelectorList::parse(",div").is_err());
    assert!(SelectorList::parse("div >").is_err());
    assert!(SelectorList::parse("div:has(").is_err());
    assert!(SelectorList::parse(r#"[a="unterminated]"#).is_err());
}

// ============================================================================
// MARKER STYLESHEET
// ============================================================================

#[test]
fn test_marker_stylesheet_covers_every_class() {
    let css = marker_stylesheet(["turn-hidden", "turn-empty"]).unwrap();
    assert!(css.contains(".turn-hidden"));
    assert!(css.contains(".turn-empty"));
    assert!(css.contains("display:none!important"));
    assert!(!css.contains('\n'));
}

#[test]
fn test_minify_collapses_whitespace() {
    let css = minify("a {\n  color: red;\n}\n").unwrap();
    assert_eq!(css, "a{color:red}");
}
