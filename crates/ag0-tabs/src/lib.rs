//! Accessible tab widgets from declarative `<tabs>` markup.
//!
//! Documentation pages write tabbed content as plain markup:
//!
//! ```html
//! <tabs>
//!   <tabitem label="Python">pip install ag0</tabitem>
//!   <tabitem label="TypeScript">npm install ag0</tabitem>
//! </tabs>
//! ```
//!
//! [`TabRenderer`] replaces each group with a tab list and panels wired with
//! ARIA roles, switches panels on click and arrow keys, and marks groups so
//! repeated runs leave converted widgets alone. [`lifecycle::install`]
//! hooks the renderer to `DOMContentLoaded` and the site framework's
//! navigation event.
//!
//! # Usage
//!
//! ```
//! use std::rc::Rc;
//!
//! use ag0_dom::Document;
//! use ag0_tabs::{TabRenderer, lifecycle};
//!
//! let mut doc = Document::parse(
//!     r#"<tabs><tabitem label="A">one</tabitem><tabitem label="B">two</tabitem></tabs>"#,
//! );
//! lifecycle::install(&mut doc, Rc::new(TabRenderer::default()));
//! doc.finish_parsing();
//!
//! let tabs = doc.elements_by_tag_name(doc.root(), "button");
//! assert_eq!(doc.text_content(tabs[0]), "A");
//! assert_eq!(doc.attribute(tabs[0], "aria-selected"), Some("true"));
//!
//! doc.click(tabs[1]);
//! assert_eq!(doc.attribute(tabs[1], "aria-selected"), Some("true"));
//! ```

mod ids;
pub mod lifecycle;
mod renderer;
mod widget;

pub use ag0_config::{ClassNames, ConfigError, IdScheme, TabsConfig};
pub use ids::{IdGenerator, TabIds};
pub use renderer::{InitializeReport, TabRenderer};
pub use widget::TabWidget;
