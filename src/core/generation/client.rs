//! HTTP client for the remote generation endpoint.
//!
//! One authenticated JSON POST per attempt; no retry. The caller decides
//! whether to try again.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::models::ModelRegistry;

use super::error::{GenerateError, extract_error_message};

/// Wire request for the generation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(rename = "model")]
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: model_id.into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            top_k: None,
            images: None,
        }
    }
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Normalized endpoint response.
///
/// `usage` is `None` when the provider reports nothing; reported zeros are
/// kept as literal measurements.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    #[serde(rename = "model")]
    pub model_id: String,
    pub provider: String,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Boundary the orchestrator calls through; lets tests inject a fake endpoint.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerateError>;
}

/// Production backend: bearer-authenticated POST to `{base}/generation`.
pub struct HttpGenerationClient {
    http: reqwest::Client,
    endpoint_base: String,
    access_token: Option<String>,
    registry: Arc<ModelRegistry>,
}

impl HttpGenerationClient {
    pub fn new(
        endpoint_base: impl Into<String>,
        access_token: Option<String>,
        registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint_base: endpoint_base.into(),
            access_token,
            registry,
        }
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerateError> {
        // Both checks happen before any network activity.
        if self.registry.get(&request.model_id).is_none() {
            return Err(GenerateError::UnsupportedModel(request.model_id.clone()));
        }
        let token = self
            .access_token
            .as_deref()
            .ok_or(GenerateError::Unauthenticated)?;

        let response = self
            .http
            .post(format!("{}/generation", self.endpoint_base))
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Generation(extract_error_message(&body, status)));
        }

        response
            .json::<GenerationResult>()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))
    }
}
