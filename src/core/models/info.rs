//! Shared model descriptor type (no dependencies on the registry).

use serde::{Deserialize, Serialize};

/// Capabilities and display metadata for one generation model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub max_tokens: u32,
    pub supports_images: bool,
}
