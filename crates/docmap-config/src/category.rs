//! Declarative navigation shape.
//!
//! A [`CategorySpec`] lists top-level groups in display order. Each group
//! holds items that are direct document paths, titled path references, or
//! nested groups. The shape is authored, never inferred from the file layout.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Ordered list of top-level navigation groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySpec {
    /// Groups in display order.
    pub groups: Vec<CategoryGroup>,
}

impl CategorySpec {
    /// True when no groups are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Load categories from a standalone TOML or YAML file.
    ///
    /// The file holds a single `categories` list. The format is picked by
    /// extension (`.yaml`/`.yml` for YAML, anything else for TOML).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file doesn't exist, or a parse
    /// error for malformed content.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let file: CategoriesFile = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        Ok(file.categories)
    }
}

/// Standalone categories file layout.
#[derive(Debug, Deserialize)]
struct CategoriesFile {
    #[serde(default)]
    categories: CategorySpec,
}

/// One top-level navigation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    /// Display title; its slug becomes the folder route.
    pub title: String,
    /// Initially expanded hint for the folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    /// Items in display order.
    #[serde(default)]
    pub items: Vec<CategoryItem>,
}

/// Entry inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryItem {
    /// Direct reference to a document path.
    Path(String),
    /// Document shown under a display title decoupled from its path.
    Titled {
        /// Display title; its slug becomes the page route.
        title: String,
        /// Document path.
        path: String,
    },
    /// Nested group.
    Nested {
        /// Display title; its slug extends the parent route.
        title: String,
        /// Initially expanded hint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        open: Option<bool>,
        /// Child items in display order.
        children: Vec<CategoryItem>,
    },
}
