//! Configuration management for ag0 tabs.
//!
//! Parses `ag0.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Every field has a default matching the markup the documentation site
//! emits, so an absent file or an empty `[tabs]` section is valid:
//!
//! ```toml
//! [tabs]
//! group_tag = "tabs"
//! entry_tag = "tabitem"
//! label_attribute = "label"
//! processed_attribute = "data-ag0-tabs-processed"
//! navigation_event = "astro:page-load"
//! id_prefix = "ag0"
//! id_scheme = "sequential"
//!
//! [tabs.classes]
//! widget = "ag0-tabs"
//! active = "is-active"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "ag0.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tab widget configuration.
    pub tabs: TabsConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Tab widget markup contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// Tag of the declarative tab group container.
    pub group_tag: String,
    /// Tag of a tab entry inside a group.
    pub entry_tag: String,
    /// Entry attribute holding the tab label.
    pub label_attribute: String,
    /// Marker attribute set on groups that have been processed.
    pub processed_attribute: String,
    /// Event fired by the site framework after client-side navigation.
    pub navigation_event: String,
    /// Prefix for generated element ids.
    pub id_prefix: String,
    /// How element ids are generated.
    pub id_scheme: IdScheme,
    /// CSS classes on generated elements.
    pub classes: ClassNames,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            group_tag: "tabs".to_owned(),
            entry_tag: "tabitem".to_owned(),
            label_attribute: "label".to_owned(),
            processed_attribute: "data-ag0-tabs-processed".to_owned(),
            navigation_event: "astro:page-load".to_owned(),
            id_prefix: "ag0".to_owned(),
            id_scheme: IdScheme::default(),
            classes: ClassNames::default(),
        }
    }
}

/// Element id generation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// Process-wide counter; ids never collide.
    #[default]
    Sequential,
    /// Random base-36 suffix plus entry index.
    Random,
}

/// CSS classes applied to the generated widget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    /// Outer widget container.
    pub widget: String,
    /// Tab list container.
    pub tablist: String,
    /// Tab button.
    pub tab: String,
    /// Panels container.
    pub panels: String,
    /// Tab panel.
    pub panel: String,
    /// Added to the selected tab button.
    pub active: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            widget: "ag0-tabs".to_owned(),
            tablist: "ag0-tabs__tablist".to_owned(),
            tab: "ag0-tabs__tab".to_owned(),
            panels: "ag0-tabs__panels".to_owned(),
            panel: "ag0-tabs__panel".to_owned(),
            active: "is-active".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a markup name (tag, attribute, class, id prefix) to be a single token.
fn require_token(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '=' | '/'))
    {
        return Err(ConfigError::Validation(format!(
            "{field} must be a single name without whitespace or markup characters"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `ag0.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }
        match Self::discover_config() {
            Some(discovered) => Self::load_from_file(&discovered),
            None => Ok(Self::default()),
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tabs.validate()
    }
}

impl TabsConfig {
    /// Validate the markup names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_token(&self.group_tag, "tabs.group_tag")?;
        require_token(&self.entry_tag, "tabs.entry_tag")?;
        require_token(&self.label_attribute, "tabs.label_attribute")?;
        require_token(&self.processed_attribute, "tabs.processed_attribute")?;
        require_token(&self.navigation_event, "tabs.navigation_event")?;
        require_token(&self.id_prefix, "tabs.id_prefix")?;

        if self.group_tag.eq_ignore_ascii_case(&self.entry_tag) {
            return Err(ConfigError::Validation(
                "tabs.group_tag and tabs.entry_tag must differ".into(),
            ));
        }

        let classes = &self.classes;
        require_token(&classes.widget, "tabs.classes.widget")?;
        require_token(&classes.tablist, "tabs.classes.tablist")?;
        require_token(&classes.tab, "tabs.classes.tab")?;
        require_token(&classes.panels, "tabs.classes.panels")?;
        require_token(&classes.panel, "tabs.classes.panel")?;
        require_token(&classes.active, "tabs.classes.active")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tabs.group_tag, "tabs");
        assert_eq!(config.tabs.entry_tag, "tabitem");
        assert_eq!(config.tabs.label_attribute, "label");
        assert_eq!(config.tabs.processed_attribute, "data-ag0-tabs-processed");
        assert_eq!(config.tabs.navigation_event, "astro:page-load");
        assert_eq!(config.tabs.id_scheme, IdScheme::Sequential);
        assert_eq!(config.tabs.classes.active, "is-active");
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tabs, TabsConfig::default());
    }

    #[test]
    fn test_parse_tabs_config() {
        let toml = r#"
[tabs]
group_tag = "doc-tabs"
entry_tag = "doc-tab"
id_scheme = "random"

[tabs.classes]
active = "selected"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.tabs.group_tag, "doc-tabs");
        assert_eq!(config.tabs.entry_tag, "doc-tab");
        assert_eq!(config.tabs.id_scheme, IdScheme::Random);
        assert_eq!(config.tabs.classes.active, "selected");
        // Unset fields keep defaults
        assert_eq!(config.tabs.label_attribute, "label");
        assert_eq!(config.tabs.classes.widget, "ag0-tabs");
    }

    #[test]
    fn test_parse_unknown_id_scheme_fails() {
        let result: Result<Config, _> = toml::from_str("[tabs]\nid_scheme = \"uuid\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag0.toml");
        std::fs::write(&path, "[tabs]\nid_prefix = \"docs\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.tabs.id_prefix, "docs");
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path)).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag0.toml");
        std::fs::write(&path, "[tabs\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag0.toml");
        std::fs::write(&path, "[tabs]\ngroup_tag = \"\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site").join("src");
        std::fs::create_dir_all(&nested).unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        assert_eq!(Config::discover_from(&nested), Some(path));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(tabs: &TabsConfig, expected_substrings: &[&str]) {
        let result = tabs.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_entry_tag() {
        let tabs = TabsConfig {
            entry_tag: String::new(),
            ..Default::default()
        };
        assert_validation_error(&tabs, &["tabs.entry_tag", "cannot be empty"]);
    }

    #[test]
    fn test_validate_whitespace_in_class() {
        let mut tabs = TabsConfig::default();
        tabs.classes.active = "is active".to_owned();
        assert_validation_error(&tabs, &["tabs.classes.active", "single name"]);
    }

    #[test]
    fn test_validate_markup_in_attribute() {
        let tabs = TabsConfig {
            processed_attribute: "data-x=\"1\"".to_owned(),
            ..Default::default()
        };
        assert_validation_error(&tabs, &["tabs.processed_attribute"]);
    }

    #[test]
    fn test_validate_group_and_entry_differ() {
        let tabs = TabsConfig {
            entry_tag: "TABS".to_owned(),
            ..Default::default()
        };
        assert_validation_error(&tabs, &["must differ"]);
    }

    #[test]
    fn test_validate_navigation_event_allows_colon() {
        let tabs = TabsConfig {
            navigation_event: "astro:after-swap".to_owned(),
            ..Default::default()
        };
        assert!(tabs.validate().is_ok());
    }
}
