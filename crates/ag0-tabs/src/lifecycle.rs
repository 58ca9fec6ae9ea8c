//! Page lifecycle wiring for the tab renderer.
//!
//! The widget runs once when the document's content is ready and again
//! after every client-side navigation, always over the whole document.
//! Conversion is idempotent, so overlapping triggers are harmless.

use std::rc::Rc;

use ag0_dom::{Document, Event, EventType, ReadyState};

use crate::renderer::TabRenderer;

/// Register `renderer` against the document's lifecycle events.
///
/// - While the document is still loading, conversion is deferred to
///   `DOMContentLoaded`; otherwise it runs immediately.
/// - A listener for the configured navigation event re-runs conversion
///   after each soft navigation.
pub fn install(document: &mut Document, renderer: Rc<TabRenderer>) {
    let root = document.root();

    if document.ready_state() == ReadyState::Loading {
        let on_ready = Rc::clone(&renderer);
        document.add_event_listener(
            root,
            EventType::DomContentLoaded,
            Rc::new(move |doc: &mut Document, _event: &Event| {
                on_ready.initialize_document(doc);
            }),
        );
    } else {
        renderer.initialize_document(document);
    }

    let navigation = EventType::from_name(&renderer.config().navigation_event);
    tracing::debug!(event = %navigation, "Registered tab re-initialization");
    document.add_event_listener(
        root,
        navigation,
        Rc::new(move |doc: &mut Document, _event: &Event| {
            renderer.initialize_document(doc);
        }),
    );
}
