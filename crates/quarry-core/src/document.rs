//! Thin query facade over a parsed HTML tree.
//!
//! Parsing and selector matching are delegated to the `scraper` crate; this
//! module only exposes the handful of read operations the extraction engine
//! needs.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document.
///
/// Parse once with [`Document::parse`] and reuse it across several
/// extractions to avoid re-parsing the same markup.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Parse a fragment (no implied `<html>`/`<head>`/`<body>` wrapper).
    pub fn parse_fragment(markup: &str) -> Self {
        Self {
            html: Html::parse_fragment(markup),
        }
    }

    pub(crate) fn root(&self) -> Scope<'_> {
        Scope::Document(&self.html)
    }
}

/// How a raw string is read from a matched node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Text content of the node and its descendants, trimmed.
    Text,
    /// Value of the named attribute; nodes without it yield nothing.
    Attribute(String),
    /// Serialized children of the node.
    InnerHtml,
    /// Serialized node including its own tag.
    OuterHtml,
}

impl ValueSource {
    /// Read a raw value from `node`, or `None` if the node has no such value.
    pub(crate) fn read(&self, node: ElementRef<'_>) -> Option<String> {
        match self {
            ValueSource::Text => Some(node.text().collect::<String>().trim().to_string()),
            ValueSource::Attribute(name) => node.value().attr(name).map(String::from),
            ValueSource::InnerHtml => Some(node.inner_html()),
            ValueSource::OuterHtml => Some(node.html()),
        }
    }
}

/// The subtree a selector is evaluated against: the whole document or a
/// single matched element.
#[derive(Clone, Copy)]
pub(crate) enum Scope<'a> {
    Document(&'a Html),
    Element(ElementRef<'a>),
}

impl<'a> Scope<'a> {
    /// Matched nodes in document order.
    pub(crate) fn select(self, selector: &Selector) -> Vec<ElementRef<'a>> {
        match self {
            Scope::Document(html) => html.select(selector).collect(),
            Scope::Element(element) => element.select(selector).collect(),
        }
    }
}
