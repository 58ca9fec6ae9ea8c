//! Event listeners and dispatch.
//!
//! Dispatch is synchronous: every listener runs to completion on the
//! caller's stack before [`Document::dispatch`] returns. Events first reach
//! the target and then bubble through its ancestors.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::document::{Document, ReadyState};
use crate::node::NodeId;

/// Event handler callback.
///
/// Handlers receive the document mutably so they can update the tree.
pub type Listener = Rc<dyn Fn(&mut Document, &Event)>;

/// Event type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `click`
    Click,
    /// `keydown`
    KeyDown,
    /// `DOMContentLoaded`
    DomContentLoaded,
    /// `load`
    Load,
    /// Any other name, e.g. a framework navigation event.
    Custom(String),
}

impl EventType {
    /// Map an event name to its type.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "click" => Self::Click,
            "keydown" => Self::KeyDown,
            "DOMContentLoaded" => Self::DomContentLoaded,
            "load" => Self::Load,
            other => Self::Custom(other.to_owned()),
        }
    }

    /// Event name as used in markup and scripts.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::Load => "load",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dispatched event.
#[derive(Debug)]
pub struct Event {
    /// Event type.
    pub event_type: EventType,
    /// Node the event was dispatched to.
    pub target: NodeId,
    /// Key name for keyboard events (`ArrowLeft`, `Home`, ...).
    pub key: Option<String>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create an event targeting `target`.
    #[must_use]
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            key: None,
            propagation_stopped: Cell::new(false),
        }
    }

    /// Attach a key name.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Prevent the event from reaching further ancestors.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }
}

impl Document {
    /// Register `listener` for `event_type` on `target`.
    pub fn add_event_listener(&mut self, target: NodeId, event_type: EventType, listener: Listener) {
        self.listeners
            .entry(target)
            .or_default()
            .push((event_type, listener));
    }

    /// Number of listeners registered on `target` for `event_type`.
    #[must_use]
    pub fn listener_count(&self, target: NodeId, event_type: &EventType) -> usize {
        self.listeners
            .get(&target)
            .map_or(0, |list| list.iter().filter(|(t, _)| t == event_type).count())
    }

    /// Number of listeners registered across all live nodes.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Dispatch `event` to its target and bubble it up the ancestor chain.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&mut self, event: &Event) -> usize {
        let mut path = vec![event.target];
        let mut current = self.parent(event.target);
        while let Some(id) = current {
            path.push(id);
            current = self.parent(id);
        }

        let mut invoked = 0;
        for node in path {
            // Snapshot so listeners may register more listeners.
            let handlers: Vec<Listener> = self
                .listeners
                .get(&node)
                .map(|list| {
                    list.iter()
                        .filter(|(t, _)| *t == event.event_type)
                        .map(|(_, l)| Rc::clone(l))
                        .collect()
                })
                .unwrap_or_default();

            for handler in handlers {
                handler(self, event);
                invoked += 1;
            }
            if event.propagation_stopped.get() {
                break;
            }
        }

        tracing::trace!(event = %event.event_type, invoked, "Dispatched event");
        invoked
    }

    /// Dispatch an event of `event_type` to `target`.
    pub fn dispatch(&mut self, target: NodeId, event_type: EventType) -> usize {
        self.dispatch_event(&Event::new(event_type, target))
    }

    /// Simulate a user click on `target`.
    pub fn click(&mut self, target: NodeId) -> usize {
        self.dispatch(target, EventType::Click)
    }

    /// Simulate a key press on `target`.
    pub fn key_down(&mut self, target: NodeId, key: &str) -> usize {
        self.dispatch_event(&Event::new(EventType::KeyDown, target).with_key(key))
    }

    /// Mark parsing finished and fire `DOMContentLoaded` on the document.
    pub fn finish_parsing(&mut self) {
        if self.ready_state != ReadyState::Loading {
            return;
        }
        self.ready_state = ReadyState::Interactive;
        let root = self.root();
        self.dispatch(root, EventType::DomContentLoaded);
    }

    /// Mark the document fully loaded and fire `load`.
    pub fn finish_loading(&mut self) {
        self.finish_parsing();
        if self.ready_state == ReadyState::Complete {
            return;
        }
        self.ready_state = ReadyState::Complete;
        let root = self.root();
        self.dispatch(root, EventType::Load);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Listener) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_for_make = Rc::clone(&log);
        let make = move |name: &str| -> Listener {
            let log = Rc::clone(&log_for_make);
            let name = name.to_owned();
            Rc::new(move |_doc: &mut Document, _event: &Event| log.borrow_mut().push(name.clone()))
        };
        (log, make)
    }

    #[test]
    fn test_event_type_names_round_trip() {
        for name in ["click", "keydown", "DOMContentLoaded", "load", "astro:page-load"] {
            assert_eq!(EventType::from_name(name).name(), name);
        }
        assert_eq!(
            EventType::from_name("astro:page-load"),
            EventType::Custom("astro:page-load".to_owned())
        );
    }

    #[test]
    fn test_dispatch_bubbles_to_ancestors() {
        let mut doc = Document::parse("<div><button>x</button></div>");
        let div = doc.elements_by_tag_name(doc.root(), "div")[0];
        let button = doc.elements_by_tag_name(doc.root(), "button")[0];
        let (log, make) = recorder();

        doc.add_event_listener(button, EventType::Click, make("button"));
        doc.add_event_listener(div, EventType::Click, make("div"));
        doc.add_event_listener(div, EventType::KeyDown, make("div-key"));

        assert_eq!(doc.click(button), 2);
        assert_eq!(*log.borrow(), vec!["button", "div"]);
    }

    #[test]
    fn test_stop_propagation() {
        let mut doc = Document::parse("<div><button>x</button></div>");
        let div = doc.elements_by_tag_name(doc.root(), "div")[0];
        let button = doc.elements_by_tag_name(doc.root(), "button")[0];
        let (log, make) = recorder();

        doc.add_event_listener(
            button,
            EventType::Click,
            Rc::new(|_doc: &mut Document, event: &Event| event.stop_propagation()),
        );
        doc.add_event_listener(div, EventType::Click, make("div"));

        assert_eq!(doc.click(button), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_listener_can_mutate_document() {
        let mut doc = Document::parse("<button>x</button>");
        let button = doc.elements_by_tag_name(doc.root(), "button")[0];
        doc.add_event_listener(
            button,
            EventType::Click,
            Rc::new(|doc: &mut Document, event: &Event| {
                doc.set_attribute(event.target, "aria-pressed", "true");
            }),
        );

        doc.click(button);

        assert_eq!(doc.attribute(button, "aria-pressed"), Some("true"));
    }

    #[test]
    fn test_key_down_carries_key() {
        let mut doc = Document::parse("<button>x</button>");
        let button = doc.elements_by_tag_name(doc.root(), "button")[0];
        let seen = Rc::new(RefCell::new(None));
        let seen_in = Rc::clone(&seen);
        doc.add_event_listener(
            button,
            EventType::KeyDown,
            Rc::new(move |_doc: &mut Document, event: &Event| {
                *seen_in.borrow_mut() = event.key.clone();
            }),
        );

        doc.key_down(button, "ArrowRight");

        assert_eq!(seen.borrow().as_deref(), Some("ArrowRight"));
    }

    #[test]
    fn test_finish_parsing_fires_once() {
        let mut doc = Document::new();
        let (log, make) = recorder();
        doc.add_event_listener(doc.root(), EventType::DomContentLoaded, make("ready"));
        doc.add_event_listener(doc.root(), EventType::Load, make("load"));

        assert_eq!(doc.ready_state(), ReadyState::Loading);
        doc.finish_parsing();
        doc.finish_parsing();
        assert_eq!(doc.ready_state(), ReadyState::Interactive);
        doc.finish_loading();
        assert_eq!(doc.ready_state(), ReadyState::Complete);

        assert_eq!(*log.borrow(), vec!["ready", "load"]);
    }

    #[test]
    fn test_listener_count() {
        let mut doc = Document::new();
        let (_log, make) = recorder();
        let root = doc.root();
        doc.add_event_listener(root, EventType::Click, make("a"));
        doc.add_event_listener(root, EventType::Click, make("b"));

        assert_eq!(doc.listener_count(root, &EventType::Click), 2);
        assert_eq!(doc.listener_count(root, &EventType::KeyDown), 0);
        assert_eq!(doc.total_listeners(), 2);
    }

    #[test]
    fn test_listener_may_destroy_its_target() {
        let mut doc = Document::parse("<div><button>x</button></div>");
        let div = doc.elements_by_tag_name(doc.root(), "div")[0];
        let button = doc.elements_by_tag_name(doc.root(), "button")[0];
        let (log, make) = recorder();
        doc.add_event_listener(
            button,
            EventType::Click,
            Rc::new(|doc: &mut Document, event: &Event| doc.destroy(event.target)),
        );
        doc.add_event_listener(div, EventType::Click, make("div"));

        // The propagation path is fixed when dispatch starts.
        assert_eq!(doc.click(button), 2);
        assert!(!doc.is_live(button));
        assert_eq!(*log.borrow(), vec!["div"]);
        assert_eq!(doc.total_listeners(), 1);
    }
}
