use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CatalogError, Result};

/// A schedulable task definition.
///
/// Field names mirror the on-disk JSON, which uses camelCase
/// (`durationSeconds`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Display name delivered with the reminder, e.g. "Iron Ingot".
    pub name: String,
    /// Seconds from scheduling until the task completes.
    pub duration_seconds: u64,
}

/// Catalog of known recipes, keyed by lookup key.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: HashMap<String, Recipe>,
}

impl RecipeCatalog {
    /// Load a catalog from a JSON file of `key -> recipe` entries.
    ///
    /// An empty file yields an empty catalog with a warning rather than an
    /// error, so a freshly provisioned data directory still boots.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        if raw.trim().is_empty() {
            warn!(path = %path.display(), "recipe file is empty");
            return Ok(Self::default());
        }
        let recipes: HashMap<String, Recipe> = serde_json::from_str(&raw)?;
        Ok(Self { recipes })
    }

    /// Look up a recipe by key.
    pub fn resolve(&self, key: &str) -> Result<&Recipe> {
        self.recipes.get(key).ok_or_else(|| CatalogError::UnknownRecipe {
            key: key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog_from(contents: &str) -> Result<RecipeCatalog> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        RecipeCatalog::load(file.path())
    }

    #[test]
    fn loads_camel_case_entries() {
        let catalog = catalog_from(
            r#"{
                "iron_ingot": { "name": "Iron Ingot", "durationSeconds": 3600 },
                "steel_beam": { "name": "Steel Beam", "durationSeconds": 10800 }
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let recipe = catalog.resolve("iron_ingot").unwrap();
        assert_eq!(recipe.name, "Iron Ingot");
        assert_eq!(recipe.duration_seconds, 3600);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let catalog = catalog_from(r#"{ "iron_ingot": { "name": "Iron Ingot", "durationSeconds": 60 } }"#)
            .unwrap();
        let err = catalog.resolve("mystery").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownRecipe { ref key } if key == "mystery"));
    }

    #[test]
    fn empty_file_yields_empty_catalog() {
        let catalog = catalog_from("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn whitespace_only_file_yields_empty_catalog() {
        let catalog = catalog_from("  \n\t\n").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = catalog_from("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecipeCatalog::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
