//! HTML parsing with the html5ever tree builder.
//!
//! html5ever implements the WHATWG parsing algorithm, so pages come out the
//! way a browser builds them: implied `<html>`, `<head>` and `<body>`, end
//! tags inferred for `<p>` and `<li>`, raw text inside `<script>` and
//! `<style>`, and the full named character reference table. The parsed
//! `RcDom` is then copied into the document arena.
//!
//! `<template>` contents are stored as ordinary children of the template.

use std::rc::Rc;

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{LocalName, Namespace, ParseOpts, QualName, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::document::Document;
use crate::node::{ElementData, NodeData, NodeId};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parse HTML into a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct HtmlParser {
    scripting: bool,
}

impl HtmlParser {
    /// Create a parser with scripting enabled, as in a browser.
    #[must_use]
    pub fn new() -> Self {
        Self { scripting: true }
    }

    /// Set the scripting flag, which decides whether `<noscript>` holds
    /// raw text or markup.
    #[must_use]
    pub fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting = enabled;
        self
    }

    fn opts(&self) -> ParseOpts {
        ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: self.scripting,
                ..TreeBuilderOpts::default()
            },
            ..ParseOpts::default()
        }
    }

    /// Parse a full page. Fragments get the implied `<html>`, `<head>` and
    /// `<body>` a browser would add.
    ///
    /// The returned document is in the `Loading` state; call
    /// [`Document::finish_parsing`] to fire `DOMContentLoaded`.
    #[must_use]
    pub fn parse(&self, html: &str) -> Document {
        let dom = parse_document(RcDom::default(), self.opts()).one(html);

        let mut document = Document::new();
        document.scripting = self.scripting;
        let root = document.root();
        copy_children(&mut document, root, &dom.document);
        document
    }

    /// Parse `html` as the content of a `context` element and append the
    /// resulting nodes to `parent`.
    pub(crate) fn parse_fragment_into(
        &self,
        document: &mut Document,
        parent: NodeId,
        context: &str,
        html: &str,
    ) {
        let context = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from(context.to_ascii_lowercase().as_str()),
        );
        let dom = parse_fragment(RcDom::default(), self.opts(), context, Vec::new()).one(html);

        // The fragment's nodes hang off a synthetic <html> element.
        for holder in dom.document.children.borrow().iter() {
            copy_children(document, parent, holder);
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Parse HTML with the default [`HtmlParser`].
    #[must_use]
    pub fn parse(html: &str) -> Self {
        HtmlParser::new().parse(html)
    }
}

/// Copy the children of `source` (and their subtrees) under `parent`.
fn copy_children(document: &mut Document, parent: NodeId, source: &Handle) {
    let mut stack: Vec<(NodeId, Handle)> = source
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (parent, Rc::clone(child)))
        .collect();

    while let Some((parent, handle)) = stack.pop() {
        match &handle.data {
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let mut element = ElementData::new(&*name.local);
                for attr in attrs.borrow().iter() {
                    element
                        .attrs
                        .push((attribute_name(&attr.name), attr.value.to_string()));
                }
                let id = document.append_new(parent, NodeData::Element(element));

                let mut children: Vec<Handle> =
                    handle.children.borrow().iter().map(Rc::clone).collect();
                if let Some(contents) = template_contents.borrow().as_ref() {
                    children.extend(contents.children.borrow().iter().map(Rc::clone));
                }
                stack.extend(children.into_iter().rev().map(|child| (id, child)));
            }
            RcNodeData::Text { contents } => {
                document.append_new(parent, NodeData::Text(contents.borrow().to_string()));
            }
            RcNodeData::Comment { contents } => {
                document.append_new(parent, NodeData::Comment(contents.to_string()));
            }
            RcNodeData::Doctype { name, .. } => {
                document.doctype = Some(name.to_string());
            }
            RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => {
                tracing::trace!("Skipping node without an HTML counterpart");
            }
        }
    }
}

/// Attribute name as written in markup, prefix included (`xlink:href`).
fn attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local),
        None => name.local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn first(doc: &Document, tag: &str) -> NodeId {
        doc.elements_by_tag_name(doc.root(), tag)[0]
    }

    #[test]
    fn test_parse_simple_element() {
        let doc = Document::parse("<p>Hello</p>");
        let p = first(&doc, "p");
        assert_eq!(doc.children(doc.body().unwrap()), &[p]);
        assert_eq!(doc.text_content(p), "Hello");
    }

    #[test]
    fn test_parse_builds_implied_structure() {
        let doc = Document::parse("<p>x</p>");
        let tags: Vec<&str> = doc
            .descendants(doc.root())
            .into_iter()
            .filter_map(|id| doc.tag_name(id))
            .collect();
        assert_eq!(tags, vec!["html", "head", "body", "p"]);
    }

    #[test]
    fn test_parse_nested_elements() {
        let doc = Document::parse("<p><strong>Bold</strong> text</p>");
        let p = first(&doc, "p");
        let strong = first(&doc, "strong");

        assert_eq!(doc.children(p).len(), 2);
        assert_eq!(doc.children(p)[0], strong);
        assert_eq!(doc.text_content(strong), "Bold");
        assert_eq!(doc.text_content(p), "Bold text");
    }

    #[test]
    fn test_parse_attributes_in_order() {
        let doc = Document::parse(r#"<tabitem label="Python" data-x='1'>x</tabitem>"#);
        let item = first(&doc, "tabitem");
        assert_eq!(
            doc.element(item).unwrap().attrs,
            vec![
                ("label".to_owned(), "Python".to_owned()),
                ("data-x".to_owned(), "1".to_owned()),
            ]
        );
    }

    #[test]
    fn test_parse_boolean_and_unquoted_attributes() {
        let doc = Document::parse("<div hidden id=panel>x</div>");
        let div = first(&doc, "div");
        assert!(doc.is_hidden(div));
        assert_eq!(doc.attribute(div, "id"), Some("panel"));
    }

    #[test]
    fn test_parse_void_elements_without_slash() {
        let doc = Document::parse("<p>Before<br>After<img src=a.png></p><p>Next</p>");
        let ps = doc.elements_by_tag_name(doc.root(), "p");
        assert_eq!(ps.len(), 2);
        assert_eq!(doc.text_content(ps[0]), "BeforeAfter");
        assert_eq!(doc.element_children(ps[0]).len(), 2);
        assert_eq!(doc.parent(ps[1]), doc.body());
    }

    #[test]
    fn test_parse_entities() {
        let doc = Document::parse("<p>a &lt; b &amp; c&nbsp;d&mdash;e &#65;</p>");
        let p = first(&doc, "p");
        assert_eq!(doc.text_content(p), "a < b & c\u{00a0}d\u{2014}e A");
        assert_eq!(doc.children(p).len(), 1);
    }

    #[test]
    fn test_parse_full_entity_table() {
        let doc = Document::parse(r#"<tabitem label="&alpha; &hearts;">&lambda; &rarr;</tabitem>"#);
        let item = first(&doc, "tabitem");
        assert_eq!(doc.attribute(item, "label"), Some("\u{3b1} \u{2665}"));
        assert_eq!(doc.text_content(item), "\u{3bb} \u{2192}");
    }

    #[test]
    fn test_parse_bare_ampersand() {
        let doc = Document::parse("<p>R&D</p>");
        assert_eq!(doc.text_content(first(&doc, "p")), "R&D");
    }

    #[test]
    fn test_parse_script_is_raw_text() {
        let doc = Document::parse(r#"<script>if (a < b && c) { x("</div>"); }</script><p>after</p>"#);
        let script = first(&doc, "script");
        assert_eq!(doc.children(script).len(), 1);
        assert_eq!(doc.text_content(script), r#"if (a < b && c) { x("</div>"); }"#);
        assert_eq!(doc.text_content(first(&doc, "p")), "after");
    }

    #[test]
    fn test_parse_div_closes_open_paragraph() {
        let doc = Document::parse("<main><p>one<div>two</div></main>");
        let main = first(&doc, "main");
        let p = first(&doc, "p");
        let div = first(&doc, "div");
        assert_eq!(doc.parent(div), Some(main));
        assert_eq!(doc.text_content(p), "one");
    }

    #[test]
    fn test_parse_unclosed_list_items() {
        let doc = Document::parse("<ul><li>one<li>two</ul><span>after</span>");
        let ul = first(&doc, "ul");
        let items = doc.elements_by_tag_name(ul, "li");
        assert_eq!(doc.element_children(ul), items);
        assert_eq!(doc.text_content(items[1]), "two");
        assert_eq!(doc.parent(first(&doc, "span")), doc.body());
    }

    #[test]
    fn test_parse_stray_end_tag_ignored() {
        let doc = Document::parse("<div>a</span>b</div>");
        assert_eq!(doc.text_content(first(&doc, "div")), "ab");
    }

    #[test]
    fn test_parse_doctype_and_comments() {
        let doc = Document::parse("<!DOCTYPE html><html><body><!-- note --><p>x</p></body></html>");
        assert_eq!(doc.doctype(), Some("html"));
        let body = doc.body().unwrap();
        assert_eq!(
            doc.data(doc.children(body)[0]),
            &NodeData::Comment(" note ".to_owned())
        );
    }

    #[test]
    fn test_parse_preserves_whitespace() {
        let doc = Document::parse("<pre>  a\n  b</pre>");
        assert_eq!(doc.text_content(first(&doc, "pre")), "  a\n  b");
    }

    #[test]
    fn test_parse_template_contents_become_children() {
        let doc = Document::parse("<template><p>later</p></template>");
        let template = first(&doc, "template");
        assert_eq!(doc.text_content(template), "later");
    }

    #[test]
    fn test_parse_noscript_depends_on_scripting() {
        let html = "<body><noscript><p>no js</p></noscript></body>";

        let scripted = HtmlParser::new().parse(html);
        assert!(scripted.elements_by_tag_name(scripted.root(), "p").is_empty());

        let plain = HtmlParser::new().with_scripting(false).parse(html);
        assert_eq!(plain.elements_by_tag_name(plain.root(), "p").len(), 1);
    }

    #[test]
    fn test_parse_leaves_document_loading() {
        let doc = Document::parse("<p>x</p>");
        assert_eq!(doc.ready_state(), crate::ReadyState::Loading);
    }

    #[test]
    fn test_parse_starlight_page() {
        let html = concat!(
            r#"<!DOCTYPE html><html lang="en" data-theme="dark"><head><meta charset="utf-8">"#,
            "<title>Install &amp; run</title>",
            "<style>.sl-tabs > li { color: red; }</style>",
            r#"<script>if (a < b && c) { x("</div>"); }</script>"#,
            r#"</head><body><nav><ul><li><a href="/guide/">Guide</a><li><a href="/api/">API</a></ul></nav>"#,
            "<main><p>Intro &alpha; &hearts; &rarr;<div>Block</div>",
            r#"<tabs><tabitem label="&lambda; Python">pip &amp; run</tabitem></tabs>"#,
            "</main></body></html>",
        );
        let expected = concat!(
            r#"<!DOCTYPE html><html lang="en" data-theme="dark"><head><meta charset="utf-8">"#,
            "<title>Install &amp; run</title>",
            "<style>.sl-tabs > li { color: red; }</style>",
            r#"<script>if (a < b && c) { x("</div>"); }</script>"#,
            r#"</head><body><nav><ul><li><a href="/guide/">Guide</a></li><li><a href="/api/">API</a></li></ul></nav>"#,
            "<main><p>Intro \u{3b1} \u{2665} \u{2192}</p><div>Block</div>",
            "<tabs><tabitem label=\"\u{3bb} Python\">pip &amp; run</tabitem></tabs>",
            "</main></body></html>",
        );

        let doc = Document::parse(html);

        assert_eq!(doc.to_html(), expected);
        let item = first(&doc, "tabitem");
        assert_eq!(doc.attribute(item, "label"), Some("\u{3bb} Python"));
    }
}
