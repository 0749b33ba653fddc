//! Generation pipeline: quota gate, endpoint call, history recording.

mod client;
mod error;

pub use client::{
    GenerationBackend, GenerationRequest, GenerationResult, HttpGenerationClient, TokenUsage,
};
pub use error::GenerateError;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::core::history::{HistoryEntry, HistoryStore};
use crate::core::monitor::Monitor;
use crate::core::quota::{self, QuotaSource};

/// One generation attempt as the caller describes it.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub prompt: String,
    pub model_id: String,
    pub template_id: Option<String>,
    pub template_name: Option<String>,
    pub variables: HashMap<String, String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub images: Option<Vec<String>>,
}

impl GenerationInput {
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: model_id.into(),
            template_id: None,
            template_name: None,
            variables: HashMap::new(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            top_k: None,
            images: None,
        }
    }

    fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.clone(),
            model_id: self.model_id.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            images: self.images.clone(),
        }
    }
}

/// Coordinates one generation attempt end to end. All collaborators are
/// injected; composition happens once, at the CLI boundary.
pub struct Generator {
    backend: Arc<dyn GenerationBackend>,
    quota: Arc<dyn QuotaSource>,
    monitor: Arc<dyn Monitor>,
    history: HistoryStore,
}

impl Generator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        quota: Arc<dyn QuotaSource>,
        history: HistoryStore,
        monitor: Arc<dyn Monitor>,
    ) -> Self {
        Self {
            backend,
            quota,
            monitor,
            history,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Run one attempt: quota check, endpoint call, history recording.
    ///
    /// The quota gate runs before any network activity. A persistence failure
    /// after a successful call never turns into a generation failure; the
    /// entry is still recorded in the session view and fallback cache.
    pub async fn generate(&mut self, input: GenerationInput) -> Result<HistoryEntry, GenerateError> {
        let limit = self.quota.feature_limit(quota::AI_GENERATIONS);
        let used = self.history.count();
        self.monitor.breadcrumb(
            "generation",
            "quota check",
            json!({ "used": used, "limit": limit }),
        );
        if !quota::within_limit(used, limit) {
            self.monitor
                .breadcrumb("generation", "quota exceeded", json!({ "limit": limit }));
            return Err(GenerateError::QuotaExceeded { limit });
        }

        let request = input.to_request();
        self.monitor.breadcrumb(
            "generation",
            "requesting",
            json!({ "model": request.model_id }),
        );
        let result = match self.backend.generate(&request).await {
            Ok(result) => result,
            Err(e) => {
                self.monitor.capture_error("generation.request", &e);
                self.monitor
                    .breadcrumb("generation", "failed", json!({ "model": request.model_id }));
                return Err(e);
            }
        };
        self.monitor.breadcrumb(
            "generation",
            "succeeded",
            json!({ "model": result.model_id, "provider": result.provider }),
        );

        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            prompt: input.prompt,
            content: result.content,
            template_id: input.template_id,
            template_name: input.template_name,
            variables: input.variables,
            model_id: result.model_id,
            provider: result.provider,
            created_at: Utc::now(),
            usage: result.usage,
        };
        self.history.record(entry.clone()).await;
        Ok(entry)
    }
}
