//! Marker stylesheet
//!
//! The rules a host page injects so hidden markers take effect. Built as
//! plain CSS text, then parsed and minified with lightningcss.

use crate::StylesheetError;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

/// Stylesheet hiding every element carrying one of `classes`
pub fn marker_stylesheet<'a>(
    classes: impl IntoIterator<Item = &'a str>,
) -> Result<String, StylesheetError> {
    let mut css = String::new();
    for class in classes {
        css.push_str(&format!(".{class} {{\n  display: none !important;\n}}\n"));
    }
    minify(&css)
}

/// Minify a stylesheet
pub fn minify(css: &str) -> Result<String, StylesheetError> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| StylesheetError::Parse(e.to_string()))?;

    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| StylesheetError::Minify(e.to_string()))?;

    let out = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| StylesheetError::Print(e.to_string()))?;

    tracing::debug!(bytes = out.code.len(), "minified stylesheet");
    Ok(out.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_stylesheet() {
        let css = marker_stylesheet(["universal-ai-fixer-hidden", "universal-ai-fixer-empty-hidden"])
            .unwrap();
        assert!(css.contains(".universal-ai-fixer-hidden"));
        assert!(css.contains(".universal-ai-fixer-empty-hidden"));
        assert!(css.contains("display:none!important"));
        assert!(!css.contains('\n'));
    }

    #[test]
    fn test_minify_strips_whitespace() {
        let css = minify(".a { color: red; }\n.b { color: red; }\n").unwrap();
        assert!(css.contains("color:red"));
        assert!(!css.contains(' '));
    }

    #[test]
    fn test_empty_class_set() {
        assert_eq!(marker_stylesheet([]).unwrap(), "");
    }
}
