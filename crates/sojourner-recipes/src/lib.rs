//! `sojourner-recipes`: the catalog of schedulable task definitions.
//!
//! A recipe maps a lookup key to a display name and a completion duration.
//! The command layer resolves the key before scheduling, so the scheduler
//! itself never sees recipe keys, only resolved task names and due times.

pub mod catalog;
pub mod error;

pub use catalog::{Recipe, RecipeCatalog};
pub use error::{CatalogError, Result};
