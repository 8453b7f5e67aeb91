//! turnwin HTML
//!
//! Loads saved chat page snapshots into a [`turnwin_dom::Document`] and
//! writes annotated documents back out.

mod parser;
mod serialize;

pub use parser::HtmlParser;
pub use serialize::to_html;

use turnwin_dom::Document;

/// Parse an HTML snapshot served from `url`
pub fn parse_document(html: &str, url: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse_with_url(html, url)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),
}
