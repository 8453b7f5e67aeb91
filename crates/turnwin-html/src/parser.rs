//! HTML5 parser
//!
//! Uses html5ever's RcDom and converts it into the arena document. Every
//! text node is kept, including the whitespace between inline elements, so
//! text content and serialized output match the source page.

use crate::ParseError;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use turnwin_dom::{Document, NodeId};

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document at `about:blank`
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a page URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        let root = document.root();
        self.convert_node(&dom.document, &mut document, root);

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    fn convert_node(&self, handle: &Handle, doc: &mut Document, parent: NodeId) {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, doc, parent);
                }
            }
            RcNodeData::Text { contents } => {
                let id = doc.create_text(&contents.borrow());
                self.attach(doc, parent, id);
            }
            RcNodeData::Comment { contents } => {
                let id = doc.create_comment(contents);
                self.attach(doc, parent, id);
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = doc.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    doc.set_attribute(id, &attr.name.local, &attr.value);
                }
                self.attach(doc, parent, id);

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, doc, id);
                }
            }
            // Doctype and processing instructions carry nothing the engine reads
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}
        }
    }

    fn attach(&self, doc: &mut Document, parent: NodeId, child: NodeId) {
        if let Err(e) = doc.append_child(parent, child) {
            tracing::warn!("dropping node {:?}: {}", child, e);
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}
