//! Model registry: lookup, filtering, and the default model pointer.
//!
//! The catalog is embedded at compile time from `config/models.json` and is
//! read-only for the process lifetime; only the default pointer is mutable.

use serde::Deserialize;

use crate::core::util;

use super::info::ModelDescriptor;

#[derive(Deserialize)]
struct CatalogFile {
    default: String,
    models: Vec<ModelDescriptor>,
}

/// Attempt to select an id the catalog does not contain.
#[derive(Debug, thiserror::Error)]
#[error("Unknown model: {0}")]
pub struct UnknownModelError(pub String);

/// In-memory catalog of generation models plus the current default.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    default_id: String,
}

impl ModelRegistry {
    /// Build the registry from the embedded catalog.
    /// The catalog is validated at build time, so parsing cannot fail here.
    pub fn builtin() -> Self {
        let json = include_str!("../../../config/models.json");
        let catalog: CatalogFile =
            serde_json::from_str(json).expect("models.json must be valid");
        Self {
            models: catalog.models,
            default_id: catalog.default,
        }
    }

    /// Look up a model by id. Unknown ids return `None`, never an error.
    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn all(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Filter models by query (case-insensitive match on id or name).
    pub fn filter(&self, query: &str) -> Vec<&ModelDescriptor> {
        util::filter_by_query(&self.models, query, |m| (m.id.as_str(), m.name.as_str()))
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_id
    }

    /// Change the default model. Rejects ids not in the catalog and leaves
    /// the previous default intact.
    pub fn set_default_model(&mut self, id: &str) -> Result<(), UnknownModelError> {
        if self.get(id).is_none() {
            return Err(UnknownModelError(id.to_string()));
        }
        self.default_id = id.to_string();
        Ok(())
    }
}
