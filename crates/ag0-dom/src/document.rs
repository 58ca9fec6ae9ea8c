//! Document arena: tree structure, queries and mutation.

use std::collections::HashMap;
use std::fmt;

use crate::error::DomError;
use crate::event::{EventType, Listener};
use crate::node::{DESTROYED, ElementData, Node, NodeData, NodeId, Slot};
use crate::parser::HtmlParser;

/// Document loading state, mirroring `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Markup is still being parsed.
    Loading,
    /// Parsing finished; `DOMContentLoaded` has fired.
    Interactive,
    /// All resources loaded.
    Complete,
}

/// An HTML document stored as a node arena.
///
/// Detaching a node removes it from the tree but keeps its [`NodeId`]
/// valid. Destroying a node ([`Document::destroy`], or replacing content
/// with [`Document::set_inner_html`]) frees its slot for reuse and drops
/// the listeners registered on it.
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    pub(crate) doctype: Option<String>,
    pub(crate) ready_state: ReadyState,
    pub(crate) scripting: bool,
    pub(crate) focused: Option<NodeId>,
    pub(crate) listeners: HashMap<NodeId, Vec<(EventType, Listener)>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .field("doctype", &self.doctype)
            .field("ready_state", &self.ready_state)
            .field("listeners", &self.total_listeners())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document in the [`ReadyState::Loading`] state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(NodeData::Document)),
            }],
            free: Vec::new(),
            doctype: None,
            ready_state: ReadyState::Loading,
            scripting: true,
            focused: None,
            listeners: HashMap::new(),
        }
    }

    /// The document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    /// Doctype name, if the source declared one.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Current loading state.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// The `<body>` element, if present.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.elements_by_tag_name(self.root(), "body")
            .into_iter()
            .next()
    }

    /// Number of live nodes, the document node included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether `id` refers to a node that has not been destroyed.
    #[must_use]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node(&self, id: NodeId) -> &Node {
        self.get(id).unwrap_or(&DESTROYED)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(Node::new(data));
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(data)),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Empty the slot of `id` and bump its generation.
    fn release(&mut self, id: NodeId) -> Option<Node> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    /// Link a detached `child` as the last child of `parent`.
    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
    }

    // --- creation ---

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a detached element from prepared data.
    pub fn create_element_with(&mut self, element: ElementData) -> NodeId {
        self.push(NodeData::Element(element))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_owned()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_owned()))
    }

    // --- node access ---

    /// Node payload.
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    /// Element data, or `None` for non-element nodes.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.get_mut(id)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Whether `id` is an element with the given tag (ASCII case-insensitive).
    #[must_use]
    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.element(id).is_some_and(|el| el.is(tag))
    }

    // --- tree navigation ---

    /// Parent node, `None` for the root, detached and destroyed nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// First child node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    /// Element children in order (text and comments skipped).
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some())
            .collect()
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `root` with the given tag, in document order.
    ///
    /// Like `querySelectorAll`, `root` itself is never included and the
    /// result is a snapshot unaffected by later mutation.
    #[must_use]
    pub fn elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.is_element(id, tag))
            .collect()
    }

    /// First connected element whose `id` attribute equals `value`.
    #[must_use]
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.attribute(id, "id") == Some(value))
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether `id` is attached to the document tree.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    /// Concatenated text of `id` and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match &self.node(id).data {
            NodeData::Text(text) => text.clone(),
            NodeData::Comment(_) => String::new(),
            NodeData::Document | NodeData::Element(_) => {
                let mut out = String::new();
                for desc in self.descendants(id) {
                    if let NodeData::Text(text) = &self.node(desc).data {
                        out.push_str(text);
                    }
                }
                out
            }
        }
    }

    // --- attributes ---

    /// Attribute value of an element.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    /// Whether an element carries the attribute.
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute. No-op on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    /// Remove an attribute. No-op on non-element nodes.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_attr(name);
        }
    }

    /// Whether the element's class list contains `class`.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// Force `class` on or off, like `classList.toggle(class, force)`.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, present: bool) {
        if let Some(el) = self.element_mut(id) {
            el.toggle_class(class, present);
        }
    }

    /// Whether the element carries the `hidden` attribute.
    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.has_attribute(id, "hidden")
    }

    /// Set or clear the `hidden` attribute.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if hidden {
            self.set_attribute(id, "hidden", "");
        } else {
            self.remove_attribute(id, "hidden");
        }
    }

    // --- mutation ---

    /// Detach `id` from its parent. No-op for detached nodes.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get_mut(id).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&c| c != id);
        }
    }

    /// Detach `id` and free it together with its subtree.
    ///
    /// Listeners on the freed nodes are dropped. Handles to them become
    /// stale: reads see an empty detached node, mutations are ignored and
    /// insertions fail with [`DomError::Destroyed`]. The document node
    /// cannot be destroyed.
    pub fn destroy(&mut self, id: NodeId) {
        if id == self.root() || !self.is_live(id) {
            return;
        }
        self.detach(id);

        let mut freed = 0usize;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.release(next) else {
                continue;
            };
            self.listeners.remove(&next);
            if self.focused == Some(next) {
                self.focused = None;
            }
            stack.extend(node.children);
            freed += 1;
        }
        tracing::trace!(freed, "Destroyed subtree");
    }

    /// Destroy every child of `id`.
    fn clear_children(&mut self, id: NodeId) {
        for child in self.node(id).children.clone() {
            self.destroy(child);
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.is_live(parent) || !self.is_live(child) {
            return Err(DomError::Destroyed);
        }
        if child == self.root() {
            return Err(DomError::Hierarchy("cannot insert the document node".into()));
        }
        if self.contains(child, parent) {
            return Err(DomError::Hierarchy(
                "cannot insert a node into its own subtree".into(),
            ));
        }
        if matches!(self.data(parent), NodeData::Text(_) | NodeData::Comment(_)) {
            return Err(DomError::Hierarchy(
                "text and comment nodes cannot have children".into(),
            ));
        }
        Ok(())
    }

    /// Append `child` to `parent`, moving it from its current position.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Hierarchy`] if the move would create a cycle or
    /// the parent cannot hold children, and [`DomError::Destroyed`] if
    /// either node no longer exists.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.link(parent, child);
        Ok(())
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Hierarchy`] if `to` lies inside `from`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), DomError> {
        while let Some(child) = self.first_child(from) {
            self.append_child(to, child)?;
        }
        Ok(())
    }

    /// Put `replacement` at the position of `old` and detach `old`.
    ///
    /// `old` stays alive so it can be reinserted; call [`Document::destroy`]
    /// when it is no longer needed. A detached `old` makes this a no-op, as
    /// `Element.replaceWith` is.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Hierarchy`] if `replacement` is an ancestor of
    /// `old`.
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.parent(old) else {
            return Ok(());
        };
        if old == replacement {
            return Ok(());
        }
        self.check_insert(parent, replacement)?;
        self.detach(replacement);

        if let Some(node) = self.get_mut(parent)
            && let Some(pos) = node.children.iter().position(|&c| c == old)
        {
            node.children[pos] = replacement;
        }
        if let Some(node) = self.get_mut(old) {
            node.parent = None;
        }
        if let Some(node) = self.get_mut(replacement) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Replace all children of `id` with a single text node.
    ///
    /// The previous children are destroyed.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        match self.get_mut(id).map(|node| &mut node.data) {
            None => return,
            Some(NodeData::Text(t) | NodeData::Comment(t)) => {
                text.clone_into(t);
                return;
            }
            Some(_) => {}
        }
        self.clear_children(id);
        if !text.is_empty() {
            let node = self.create_text(text);
            self.link(id, node);
        }
    }

    /// Replace all children of `id` with nodes parsed from `html`.
    ///
    /// This is how client-side navigation swaps page content in. The markup
    /// is parsed as a fragment in the context of `id`, and the previous
    /// children are destroyed along with their listeners. No-op on text and
    /// comment nodes.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        let context = match self.data(id) {
            NodeData::Element(el) => el.tag.clone(),
            NodeData::Document => "body".to_owned(),
            NodeData::Text(_) | NodeData::Comment(_) => return,
        };
        self.clear_children(id);
        let parser = HtmlParser::new().with_scripting(self.scripting);
        parser.parse_fragment_into(self, id, &context, html);
    }

    /// Attach a freshly created node without hierarchy checks (parser use).
    pub(crate) fn append_new(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let node = self.push(data);
        self.link(parent, node);
        node
    }

    // --- focus ---

    /// Move focus to `id`.
    pub fn focus(&mut self, id: NodeId) {
        self.focused = Some(id);
    }

    /// Currently focused element.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }
}
