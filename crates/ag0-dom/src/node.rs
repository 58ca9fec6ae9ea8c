//! Node storage for the document arena.

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are serialized without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Check whether `tag` is an HTML void element.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Check whether `tag` holds raw text (`<script>`, `<style>`, ...).
#[must_use]
pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Handle to a node owned by a [`Document`](crate::Document).
///
/// Handles stay valid while the node exists, including after it is detached
/// from the tree. Once the node is destroyed its slot may be reused; the
/// generation tells the stale handle apart from the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

/// Kind-specific node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document node at the root of the tree.
    Document,
    /// An element with tag name and attributes.
    Element(ElementData),
    /// Character data.
    Text(String),
    /// Comment content (without the `<!--` `-->` delimiters).
    Comment(String),
}

/// Element tag and attributes.
///
/// Attributes keep their source order so serialization is stable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementData {
    /// Tag name as written in the source.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    /// Create element data with no attributes.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name: String = name.into();
        self.set_attr(&name, value);
        self
    }

    /// Whether this element has the given tag (ASCII case-insensitive).
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Attribute value by name (ASCII case-insensitive).
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_owned(), value));
        }
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.attrs.len() != before
    }

    /// Whether the `class` attribute contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    /// Add or remove `class` from the `class` attribute.
    pub fn toggle_class(&mut self, class: &str, present: bool) {
        let mut classes: Vec<&str> = self
            .attr("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default();
        let has = classes.contains(&class);
        if has == present {
            return;
        }
        if present {
            classes.push(class);
        } else {
            classes.retain(|c| *c != class);
        }
        let joined = classes.join(" ");
        self.set_attr("class", joined);
    }
}

/// Arena slot: payload plus tree links.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }
}

/// What reads through a stale [`NodeId`] observe: an empty, detached node.
pub(crate) static DESTROYED: Node = Node {
    parent: None,
    children: Vec::new(),
    data: NodeData::Comment(String::new()),
};

/// Arena slot. `node` is `None` while the slot sits on the free list.
#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) node: Option<Node>,
}
