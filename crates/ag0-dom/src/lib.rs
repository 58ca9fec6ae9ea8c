//! Arena DOM for rendered documentation pages.
//!
//! Provides the browser-side pieces the tab widget runs against:
//! - [`Document`]: node arena with tree queries and move-based mutation
//! - [`HtmlParser`]: browser-grade HTML parsing with html5ever
//! - Serialization via [`Document::to_html`] and friends
//! - Event listeners with bubbling dispatch and ready-state transitions
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use ag0_dom::{Document, Event, EventType};
//!
//! let mut doc = Document::parse(r#"<button id="go">Go</button>"#);
//! let button = doc.element_by_id("go").unwrap();
//!
//! doc.add_event_listener(
//!     button,
//!     EventType::Click,
//!     Rc::new(|doc: &mut Document, event: &Event| {
//!         doc.set_attribute(event.target, "aria-pressed", "true");
//!     }),
//! );
//! doc.click(button);
//!
//! assert_eq!(doc.outer_html(button), r#"<button id="go" aria-pressed="true">Go</button>"#);
//! ```

mod document;
pub mod error;
mod event;
mod node;
mod parser;
mod serializer;

pub use document::{Document, ReadyState};
pub use error::DomError;
pub use event::{Event, EventType, Listener};
pub use node::{ElementData, NodeData, NodeId, is_raw_text_element, is_void_element};
pub use parser::HtmlParser;
