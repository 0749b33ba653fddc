//! Static model catalog and registry.

mod info;
mod registry;

pub use info::ModelDescriptor;
pub use registry::{ModelRegistry, UnknownModelError};
