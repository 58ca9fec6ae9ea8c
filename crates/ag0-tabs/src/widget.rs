//! Runtime state of a converted tab group.

use std::cell::Cell;

use ag0_dom::{Document, NodeId};

/// A converted tab group: ordered (button, panel) pairs and the active index.
///
/// Exactly one pair is active after every [`activate`](Self::activate).
#[derive(Debug)]
pub struct TabWidget {
    container: NodeId,
    tablist: NodeId,
    tabs: Vec<NodeId>,
    panels: Vec<NodeId>,
    active: Cell<usize>,
    active_class: String,
}

impl TabWidget {
    pub(crate) fn new(
        container: NodeId,
        tablist: NodeId,
        tabs: Vec<NodeId>,
        panels: Vec<NodeId>,
        active_class: String,
    ) -> Self {
        debug_assert_eq!(tabs.len(), panels.len());
        Self {
            container,
            tablist,
            tabs,
            panels,
            active: Cell::new(0),
            active_class,
        }
    }

    /// Outer widget element that replaced the group.
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Element with `role="tablist"`.
    #[must_use]
    pub fn tablist(&self) -> NodeId {
        self.tablist
    }

    /// Tab buttons in order.
    #[must_use]
    pub fn tabs(&self) -> &[NodeId] {
        &self.tabs
    }

    /// Tab panels in order.
    #[must_use]
    pub fn panels(&self) -> &[NodeId] {
        &self.panels
    }

    /// Number of tabs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Whether the widget has no tabs. Never true for converted groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Index of the selected tab.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active.get()
    }

    /// Select tab `index`, deselecting and hiding every other pair.
    ///
    /// Out-of-range indices are ignored.
    pub fn activate(&self, doc: &mut Document, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        for (i, (&tab, &panel)) in self.tabs.iter().zip(&self.panels).enumerate() {
            let selected = i == index;
            doc.set_attribute(tab, "aria-selected", if selected { "true" } else { "false" });
            doc.set_attribute(tab, "tabindex", if selected { "0" } else { "-1" });
            doc.toggle_class(tab, &self.active_class, selected);
            doc.set_hidden(panel, !selected);
        }
        self.active.set(index);
    }

    /// Handle a key press on one of the tab buttons.
    ///
    /// Arrow keys move to the neighbouring tab (wrapping), `Home` and `End`
    /// jump to the first and last tab. The new tab is activated and focused.
    /// Returns `false` when the key or target is not handled.
    pub fn handle_key(&self, doc: &mut Document, target: NodeId, key: &str) -> bool {
        let Some(current) = self.tabs.iter().position(|&t| t == target) else {
            return false;
        };
        let last = self.tabs.len() - 1;
        let next = match key {
            "ArrowRight" => {
                if current == last {
                    0
                } else {
                    current + 1
                }
            }
            "ArrowLeft" => {
                if current == 0 {
                    last
                } else {
                    current - 1
                }
            }
            "Home" => 0,
            "End" => last,
            _ => return false,
        };
        self.activate(doc, next);
        doc.focus(self.tabs[next]);
        true
    }
}
