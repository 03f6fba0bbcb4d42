//! Question-answering backend abstraction.
//!
//! Handlers ask a [`QaClientProvider`] for a client on every request. The
//! provider returns `None` when credentials are missing, which the handler
//! reports as a configuration error.

use crate::config::LanguageServiceSettings;
use crate::services::language_client::LanguageQaClient;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

/// Error type for backend calls.
#[derive(Error, Debug)]
pub enum QaClientError {
    #[error("Question answering service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Candidate answers in the order the backend ranked them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBaseAnswers {
    pub answers: Vec<KnowledgeBaseAnswer>,
}

/// One candidate answer.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBaseAnswer {
    pub answer: String,
    /// Backend score in [0, 1], if it sent one.
    pub confidence: Option<f64>,
    /// Document the answer was taken from.
    pub source: Option<String>,
}

#[async_trait]
pub trait QuestionAnswering: Send + Sync {
    async fn get_answers(
        &self,
        question: &str,
        project_name: &str,
        deployment_name: &str,
    ) -> Result<KnowledgeBaseAnswers, QaClientError>;
}

pub trait QaClientProvider: Send + Sync {
    /// A ready client, or `None` if the service is not configured.
    fn client(&self) -> Option<Arc<dyn QuestionAnswering>>;
}

/// Builds a [`LanguageQaClient`] per request from the configured endpoint and
/// key. The underlying HTTP connection pool is shared.
pub struct LanguageClientProvider {
    settings: LanguageServiceSettings,
    http: Client,
}

impl LanguageClientProvider {
    pub fn new(settings: LanguageServiceSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { settings, http })
    }
}

impl QaClientProvider for LanguageClientProvider {
    fn client(&self) -> Option<Arc<dyn QuestionAnswering>> {
        let (Some(endpoint), Some(key)) = (&self.settings.endpoint, &self.settings.key) else {
            tracing::error!("Missing AI_SERVICE_ENDPOINT or AI_SERVICE_KEY environment variables");
            return None;
        };

        Some(Arc::new(LanguageQaClient::new(
            self.http.clone(),
            endpoint,
            key.clone(),
        )))
    }
}
