//! HTML serializer.
//!
//! Follows the HTML fragment serialization rules: void elements have no end
//! tag, text inside raw text elements (`<script>`, `<style>`, ...) is
//! written verbatim, and other text and attribute values are escaped.

use std::fmt::Write;

use crate::document::Document;
use crate::node::{NodeData, NodeId, is_raw_text_element, is_void_element};

impl Document {
    /// Serialize the whole document, including the doctype.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(4096);
        if let Some(doctype) = &self.doctype {
            write!(out, "<!DOCTYPE {doctype}>").unwrap();
        }
        for &child in self.children(self.root()) {
            serialize_node(self, child, &mut out);
        }
        out
    }

    /// Serialize `id` including its own tag.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize_node(self, id, &mut out);
        out
    }

    /// Serialize the children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            serialize_node(self, child, &mut out);
        }
        out
    }
}

fn serialize_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        NodeData::Document => {
            for &child in doc.children(id) {
                serialize_node(doc, child, out);
            }
        }
        NodeData::Text(text) => {
            if in_raw_text_element(doc, id) {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeData::Comment(text) => write!(out, "<!--{text}-->").unwrap(),
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (key, value) in &el.attrs {
                if value.is_empty() {
                    write!(out, " {key}").unwrap();
                } else {
                    write!(out, r#" {key}="{}""#, escape_attr(value)).unwrap();
                }
            }
            out.push('>');

            if is_void_element(&el.tag) {
                return;
            }
            for &child in doc.children(id) {
                serialize_node(doc, child, out);
            }
            write!(out, "</{}>", el.tag).unwrap();
        }
    }
}

/// Whether the parent of `id` holds raw text.
///
/// `<noscript>` only does when the document was parsed with scripting on.
fn in_raw_text_element(doc: &Document, id: NodeId) -> bool {
    doc.parent(id)
        .and_then(|parent| doc.tag_name(parent))
        .is_some_and(|tag| {
            is_raw_text_element(tag) && (doc.scripting || !tag.eq_ignore_ascii_case("noscript"))
        })
}

/// Escape text content.
fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

/// Escape an attribute value.
fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

fn escape_html(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '\u{a0}' => result.push_str("&nbsp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}
