//! Durable history store: REST contract over the backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::generation::TokenUsage;

use super::HistoryEntry;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("History store network error: {0}")]
    Network(String),
    #[error("History store rejected request ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Durable persistence for a signed-in user's history.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn insert(&self, user_id: &str, entry: &HistoryEntry) -> Result<(), StoreError>;
    /// Most recent first, limited to the view cap.
    async fn list(&self, user_id: &str) -> Result<Vec<HistoryEntry>, StoreError>;
    async fn clear(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Wire shape of one history record.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRecord {
    id: String,
    user_id: String,
    prompt: String,
    generated_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_name: Option<String>,
    #[serde(default)]
    variables: std::collections::HashMap<String, String>,
    model: String,
    provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage_data: Option<TokenUsage>,
    created_at: DateTime<Utc>,
}

impl HistoryRecord {
    fn from_entry(user_id: &str, entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            user_id: user_id.to_string(),
            prompt: entry.prompt.clone(),
            generated_content: entry.content.clone(),
            template_id: entry.template_id.clone(),
            template_name: entry.template_name.clone(),
            variables: entry.variables.clone(),
            model: entry.model_id.clone(),
            provider: entry.provider.clone(),
            usage_data: entry.usage.clone(),
            created_at: entry.created_at,
        }
    }

    fn into_entry(self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            prompt: self.prompt,
            content: self.generated_content,
            template_id: self.template_id,
            template_name: self.template_name,
            variables: self.variables,
            model_id: self.model,
            provider: self.provider,
            created_at: self.created_at,
            usage: self.usage_data,
        }
    }
}

/// Production store speaking the history REST contract.
pub struct HttpHistoryStore {
    http: reqwest::Client,
    endpoint_base: String,
    access_token: String,
}

impl HttpHistoryStore {
    pub fn new(endpoint_base: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint_base: endpoint_base.into(),
            access_token: access_token.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/history", self.endpoint_base)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DurableStore for HttpHistoryStore {
    async fn insert(&self, user_id: &str, entry: &HistoryEntry) -> Result<(), StoreError> {
        let record = HistoryRecord::from_entry(user_id, entry);
        let response = self
            .http
            .post(self.url())
            .bearer_auth(&self.access_token)
            .json(&record)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        let response = self
            .http
            .get(self.url())
            .bearer_auth(&self.access_token)
            .query(&[("user_id", user_id), ("limit", "50")])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let response = check_status(response).await?;
        let records: Vec<HistoryRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(records.into_iter().map(HistoryRecord::into_entry).collect())
    }

    async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
        let response = self
            .http
            .delete(self.url())
            .bearer_auth(&self.access_token)
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}
