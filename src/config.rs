//! Configuration for the selection engine and the overlay renderer.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [selection]
//! max_depth = 20
//! unresolved = "warn"
//!
//! [overlay]
//! offsets = "utf16"
//! overlap = "skip"
//!
//! [overlay.marker]
//! tag = "a"
//! class = "my-popover label label-primary"
//! id_prefix = "form"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dependency walks deeper than this are aborted.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Selection engine settings
    pub selection: SelectionConfig,
    /// Overlay renderer settings
    pub overlay: OverlayConfig,
}

impl Config {
    /// Parse a configuration from TOML text.
    ///
    /// ```
    /// use annoview::config::{Config, UnresolvedPolicy};
    ///
    /// let config = Config::from_toml_str("[selection]\nunresolved = \"fail\"").unwrap();
    /// assert_eq!(config.selection.unresolved, UnresolvedPolicy::Fail);
    /// assert_eq!(config.selection.max_depth, 20);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.selection.max_depth == 0 {
            return Err(Error::config("selection.max_depth must be at least 1"));
        }
        let marker = &self.overlay.marker;
        if marker.tag.is_empty() || !marker.tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::config(format!(
                "overlay.marker.tag must be a plain element name, got '{}'",
                marker.tag
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Selection
// =============================================================================

/// What to do when a requirement names an identifier that does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Skip silently.
    Ignore,
    /// Skip and log a warning.
    #[default]
    Warn,
    /// Abort the operation with `UnknownDependencyReference`.
    Fail,
}

/// Selection engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Depth ceiling for requirement walks
    pub max_depth: usize,
    /// Handling of unresolved requirement identifiers
    pub unresolved: UnresolvedPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unresolved: UnresolvedPolicy::default(),
        }
    }
}

// =============================================================================
// Overlay
// =============================================================================

/// Unit that span and segment offsets are counted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    /// Unicode scalar values (Rust `char`s).
    Chars,
    /// UTF-16 code units, as produced by Java and JavaScript strings.
    #[default]
    Utf16,
}

/// What to do with a span that reaches into an already wrapped region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Leave the span out and log a warning.
    #[default]
    Skip,
    /// Abort rendering with `OverlappingSpans`.
    Reject,
}

/// Overlay renderer settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Offset unit of incoming spans
    pub offsets: OffsetUnit,
    /// Overlap handling
    pub overlap: OverlapPolicy,
    /// Marker markup
    pub marker: MarkerStyle,
}

/// Markup used to wrap a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerStyle {
    /// Element name
    pub tag: String,
    /// CSS classes
    pub class: String,
    /// Prefix of the generated element id; the absolute span begin follows it
    pub id_prefix: String,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            tag: "a".to_string(),
            class: "my-popover label label-primary".to_string(),
            id_prefix: "form".to_string(),
        }
    }
}
