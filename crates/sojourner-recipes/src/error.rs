use thiserror::Error;

/// Errors that can occur while loading or querying the recipe catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The recipe file could not be read.
    #[error("failed to read recipe file: {0}")]
    Io(#[from] std::io::Error),

    /// The recipe file is not valid JSON of the expected shape.
    #[error("failed to parse recipe file: {0}")]
    Parse(#[from] serde_json::Error),

    /// No recipe with the given key exists in the catalog.
    #[error("unknown recipe: {key}")]
    UnknownRecipe { key: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
