//! HTML serialization
//!
//! Writes the arena document back out so annotated snapshots can be
//! inspected in a browser.

use turnwin_dom::{Document, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize the whole document, with a doctype
pub fn to_html(doc: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    for child in doc.children(doc.root()) {
        write_node(doc, child, false, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, raw: bool, out: &mut String) {
    let Some(n) = doc.tree().get(node) else {
        return;
    };
    match &n.data {
        NodeData::Document => {}
        NodeData::Text(text) if raw => out.push_str(text),
        NodeData::Text(text) => escape_into(text, false, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for attr in &elem.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&elem.tag.as_str());
            for child in doc.children(node) {
                write_node(doc, child, raw, out);
            }
            out.push_str("</");
            out.push_str(&elem.tag);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}
