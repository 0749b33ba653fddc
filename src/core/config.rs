use std::env;

use crate::core::models::ModelRegistry;
use crate::core::persistence;
use crate::core::session::{self, Session};

const DEFAULT_ENDPOINT: &str = "https://api.postsmith.io/functions/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint_base: String,
    pub session: Session,
    pub model_id: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingAccessToken,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingAccessToken => write!(
                f,
                "No access token found. Set POSTSMITH_ACCESS_TOKEN or run `postsmith config set-token`."
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from environment and stored preferences.
/// Returns an error if no access token is available.
pub fn load(registry: &ModelRegistry) -> Result<Config, ConfigError> {
    let endpoint_base =
        env::var("POSTSMITH_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

    let session = session::resolve().ok_or(ConfigError::MissingAccessToken)?;

    let model_id = resolve_model_id(registry);

    Ok(Config {
        endpoint_base,
        session,
        model_id,
    })
}

/// Model resolution order: persisted preference, then env, then catalog default.
/// A persisted or env model unknown to the registry is ignored.
pub fn resolve_model_id(registry: &ModelRegistry) -> String {
    persistence::load_default_model()
        .filter(|id| registry.get(id).is_some())
        .or_else(|| {
            env::var("POSTSMITH_MODEL")
                .ok()
                .filter(|id| registry.get(id).is_some())
        })
        .unwrap_or_else(|| registry.default_model_id().to_string())
}
