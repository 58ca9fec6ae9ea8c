//! Conversion of `<tabs>` markup into accessible tab widgets.

use std::rc::Rc;

use ag0_config::{ConfigError, TabsConfig};
use ag0_dom::{Document, DomError, ElementData, Event, EventType, NodeId};

use crate::ids::IdGenerator;
use crate::widget::TabWidget;

/// Value of the processed marker attribute.
const PROCESSED: &str = "1";

/// Outcome of one [`TabRenderer::initialize`] pass.
#[derive(Debug, Default)]
pub struct InitializeReport {
    /// Widgets created in this pass, in document order.
    pub widgets: Vec<Rc<TabWidget>>,
    /// Groups skipped because an earlier pass already processed them.
    pub already_processed: usize,
    /// Groups left unconverted because they have no entries.
    pub empty: usize,
}

impl InitializeReport {
    /// Number of groups converted in this pass.
    #[must_use]
    pub fn converted(&self) -> usize {
        self.widgets.len()
    }
}

/// Converts declarative tab groups into interactive tab widgets.
///
/// # Input
///
/// ```html
/// <tabs>
///   <tabitem label="Python">pip install ag0</tabitem>
///   <tabitem label="TypeScript">npm install ag0</tabitem>
/// </tabs>
/// ```
///
/// # Output
///
/// ```html
/// <div class="ag0-tabs">
///   <div class="ag0-tabs__tablist" role="tablist">
///     <button type="button" class="ag0-tabs__tab is-active" role="tab" id="ag0-tab-0"
///             aria-controls="ag0-panel-0" aria-selected="true" tabindex="0">Python</button>
///     <button type="button" class="ag0-tabs__tab" role="tab" id="ag0-tab-1"
///             aria-controls="ag0-panel-1" aria-selected="false" tabindex="-1">TypeScript</button>
///   </div>
///   <div class="ag0-tabs__panels">
///     <div class="ag0-tabs__panel" role="tabpanel" id="ag0-panel-0"
///          aria-labelledby="ag0-tab-0">pip install ag0</div>
///     <div class="ag0-tabs__panel" role="tabpanel" id="ag0-panel-1"
///          aria-labelledby="ag0-tab-1" hidden>npm install ag0</div>
///   </div>
/// </div>
/// ```
#[derive(Debug)]
pub struct TabRenderer {
    config: TabsConfig,
    ids: IdGenerator,
}

impl Default for TabRenderer {
    fn default() -> Self {
        Self::with_valid_config(TabsConfig::default())
    }
}

impl TabRenderer {
    /// Create a renderer for the given markup contract.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the config names an empty or
    /// malformed tag, attribute or class, or uses the same tag for groups
    /// and entries.
    pub fn new(config: TabsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: TabsConfig) -> Self {
        let ids = IdGenerator::new(config.id_prefix.clone(), config.id_scheme);
        Self { config, ids }
    }

    /// Markup contract in use.
    #[must_use]
    pub fn config(&self) -> &TabsConfig {
        &self.config
    }

    /// Convert every unprocessed tab group under the document root.
    pub fn initialize_document(&self, doc: &mut Document) -> InitializeReport {
        let root = doc.root();
        self.initialize(doc, root)
    }

    /// Convert every unprocessed tab group below `root`.
    ///
    /// Groups are marked processed before conversion, so repeated calls on
    /// the same or overlapping subtrees never convert a group twice. Groups
    /// without entries keep their markup. A converted group is destroyed
    /// together with any children that were not entries. This never fails:
    /// a group whose conversion hits a DOM error is logged and left as is.
    pub fn initialize(&self, doc: &mut Document, root: NodeId) -> InitializeReport {
        let mut report = InitializeReport::default();

        for group in doc.elements_by_tag_name(root, &self.config.group_tag) {
            // Dropped along with an enclosing group converted earlier.
            if !doc.is_live(group) {
                continue;
            }
            if doc.attribute(group, &self.config.processed_attribute) == Some(PROCESSED) {
                report.already_processed += 1;
                continue;
            }
            doc.set_attribute(group, &self.config.processed_attribute, PROCESSED);

            let entries: Vec<NodeId> = doc
                .element_children(group)
                .into_iter()
                .filter(|&child| doc.is_element(child, &self.config.entry_tag))
                .collect();
            if entries.is_empty() {
                tracing::debug!(group = ?group, "Tab group has no entries, leaving markup");
                report.empty += 1;
                continue;
            }

            match self.convert(doc, group, &entries) {
                Ok(widget) => report.widgets.push(widget),
                Err(e) => {
                    tracing::warn!(group = ?group, error = %e, "Failed to convert tab group");
                }
            }
        }

        tracing::debug!(
            converted = report.converted(),
            already_processed = report.already_processed,
            empty = report.empty,
            "Initialized tab groups"
        );
        report
    }

    /// Build the widget for `group` detached, then swap it in.
    fn convert(
        &self,
        doc: &mut Document,
        group: NodeId,
        entries: &[NodeId],
    ) -> Result<Rc<TabWidget>, DomError> {
        let classes = &self.config.classes;

        let container =
            doc.create_element_with(ElementData::new("div").with_attr("class", &classes.widget));
        let tablist = doc.create_element_with(
            ElementData::new("div")
                .with_attr("class", &classes.tablist)
                .with_attr("role", "tablist"),
        );
        let panels_el =
            doc.create_element_with(ElementData::new("div").with_attr("class", &classes.panels));

        let mut tabs = Vec::with_capacity(entries.len());
        let mut panels = Vec::with_capacity(entries.len());

        for (idx, &entry) in entries.iter().enumerate() {
            let label = doc
                .attribute(entry, &self.config.label_attribute)
                .filter(|label| !label.is_empty())
                .map_or_else(|| format!("Tab {}", idx + 1), str::to_owned);
            let ids = self.ids.next(idx);

            let tab = doc.create_element_with(
                ElementData::new("button")
                    .with_attr("type", "button")
                    .with_attr("class", &classes.tab)
                    .with_attr("role", "tab")
                    .with_attr("id", &ids.tab)
                    .with_attr("aria-controls", &ids.panel)
                    .with_attr("aria-selected", "false")
                    .with_attr("tabindex", "-1"),
            );
            doc.set_text_content(tab, &label);

            let panel = doc.create_element_with(
                ElementData::new("div")
                    .with_attr("class", &classes.panel)
                    .with_attr("role", "tabpanel")
                    .with_attr("id", &ids.panel)
                    .with_attr("aria-labelledby", &ids.tab)
                    .with_attr("hidden", ""),
            );
            doc.move_children(entry, panel)?;

            doc.append_child(tablist, tab)?;
            doc.append_child(panels_el, panel)?;
            tabs.push(tab);
            panels.push(panel);
        }

        let widget = Rc::new(TabWidget::new(
            container,
            tablist,
            tabs,
            panels,
            classes.active.clone(),
        ));

        for (idx, &tab) in widget.tabs().iter().enumerate() {
            let handler = Rc::clone(&widget);
            doc.add_event_listener(
                tab,
                EventType::Click,
                Rc::new(move |doc: &mut Document, _event: &Event| handler.activate(doc, idx)),
            );
        }
        let handler = Rc::clone(&widget);
        doc.add_event_listener(
            tablist,
            EventType::KeyDown,
            Rc::new(move |doc: &mut Document, event: &Event| {
                let key = event.key.as_deref().unwrap_or_default();
                if handler.handle_key(doc, event.target, key) {
                    event.stop_propagation();
                }
            }),
        );

        widget.activate(doc, 0);

        doc.append_child(container, tablist)?;
        doc.append_child(container, panels_el)?;
        doc.replace_with(group, container)?;
        doc.destroy(group);

        tracing::trace!(tabs = widget.len(), "Converted tab group");
        Ok(widget)
    }
}
