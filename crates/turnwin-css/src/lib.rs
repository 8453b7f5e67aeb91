//! turnwin CSS - selector engine
//!
//! Parses the selector dialect used by the platform table and matches it
//! against a [`turnwin_dom::Document`].

mod matching;
mod parser;
mod query;
mod selectors;
mod stylesheet;

pub use matching::matches_list;
pub use parser::SelectorParser;
pub use query::ElementQuery;
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, RelativeSelector, SelectorComponent, SelectorList,
};
pub use stylesheet::{marker_stylesheet, minify};

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    #[error("unexpected '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unsupported pseudo-class: {0}")]
    UnsupportedPseudo(String),
    #[error("invalid nth expression: {0}")]
    InvalidNth(String),
}

/// Stylesheet processing errors
#[derive(Debug, thiserror::Error)]
pub enum StylesheetError {
    #[error("stylesheet parse error: {0}")]
    Parse(String),
    #[error("stylesheet minify error: {0}")]
    Minify(String),
    #[error("stylesheet print error: {0}")]
    Print(String),
}
