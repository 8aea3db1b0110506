//! Declarative annotator catalogs.
//!
//! A catalog lists the annotators a page offers and what each one requires.
//! Requirements are written either as a comma-separated string (the form the
//! page stores on its controls) or as a list:
//!
//! ```toml
//! initial = "all"
//!
//! [[annotator]]
//! id = "tokenize"
//!
//! [[annotator]]
//! id = "pos"
//! label = "Part of speech"
//! requires = "tokenize, ssplit"
//!
//! [[annotator]]
//! id = "ssplit"
//! requires = ["tokenize"]
//! ```
//!
//! The same structure is accepted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::error::{Error, Result};
use crate::selection::{parse_requires, Item, SelectionGroup};

/// Selection state a freshly loaded page starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialSelection {
    /// Everything selected, prerequisites locked. Every item counts as
    /// picked, so a prerequisite stays selected once its dependents go.
    #[default]
    All,
    /// Nothing selected.
    None,
}

/// Requirement declaration in either accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requires {
    /// `"a, b"`
    Csv(String),
    /// `["a", "b"]`
    List(Vec<String>),
}

impl Default for Requires {
    fn default() -> Self {
        Requires::List(Vec::new())
    }
}

impl Requires {
    /// Normalized identifier list.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        match self {
            Requires::Csv(decl) => parse_requires(decl),
            Requires::List(ids) => ids
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// One annotator entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotatorDecl {
    /// Identifier referenced by other entries
    pub id: String,
    /// Human-readable name
    #[serde(default)]
    pub label: Option<String>,
    /// Prerequisites
    #[serde(default)]
    pub requires: Requires,
}

/// A list of annotators plus the initial selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    /// Starting selection
    #[serde(default)]
    pub initial: InitialSelection,
    /// Annotators in display order
    #[serde(default, rename = "annotator", alias = "annotators")]
    pub annotators: Vec<AnnotatorDecl>,
}

impl Catalog {
    /// Parse a TOML catalog.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::parse(format!("catalog: {}", e)))
    }

    /// Parse a JSON catalog.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::parse(format!("catalog: {}", e)))
    }

    /// Load a catalog file; `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    /// Display label of an annotator, falling back to its id.
    #[must_use]
    pub fn label_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.annotators
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| a.label.as_deref())
            .unwrap_or(id)
    }

    /// Build the selection group and apply the initial selection.
    ///
    /// Diagnostics for unresolved references and cycles are logged. An
    /// error raised while applying the initial selection is logged too; the
    /// group is still returned in its partially propagated state.
    pub fn build(&self, config: SelectionConfig) -> Result<SelectionGroup> {
        let items = self
            .annotators
            .iter()
            .map(|a| Item::new(a.id.trim(), a.requires.ids()))
            .collect();
        let mut group = SelectionGroup::new(items)?.with_config(config);

        for issue in group.validate() {
            log::warn!("catalog: {}", issue);
        }

        if self.initial == InitialSelection::All {
            if let Err(e) = group.select_all() {
                log::warn!("initial selection incomplete: {}", e);
            }
        }
        Ok(group)
    }
}
