//! REST binding for the Azure AI Language "query knowledgebases" operation
//! (custom question answering).

use super::qa_client::{KnowledgeBaseAnswer, KnowledgeBaseAnswers, QaClientError, QuestionAnswering};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Question answering API version.
pub const API_VERSION: &str = "2021-10-01";

/// Header carrying the resource key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

const QUERY_PATH: &str = "language/:query-knowledgebases";

pub struct LanguageQaClient {
    http: Client,
    endpoint: String,
    key: Secret<String>,
}

impl LanguageQaClient {
    pub fn new(http: Client, endpoint: &str, key: Secret<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
        }
    }

    fn query_url(&self) -> String {
        format!("{}/{}", self.endpoint, QUERY_PATH)
    }
}

#[async_trait]
impl QuestionAnswering for LanguageQaClient {
    async fn get_answers(
        &self,
        question: &str,
        project_name: &str,
        deployment_name: &str,
    ) -> Result<KnowledgeBaseAnswers, QaClientError> {
        tracing::debug!(
            project = %project_name,
            deployment = %deployment_name,
            question_len = question.len(),
            "Querying knowledge base"
        );

        let response = self
            .http
            .post(self.query_url())
            .query(&[
                ("projectName", project_name),
                ("deploymentName", deployment_name),
                ("api-version", API_VERSION),
            ])
            .header(SUBSCRIPTION_KEY_HEADER, self.key.expose_secret())
            .json(&QueryKnowledgeBaseRequest { question })
            .send()
            .await
            .map_err(|e| QaClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(QaClientError::Api {
                status: status.as_u16(),
                message: service_error_message(&error_text, status),
            });
        }

        let body: QueryKnowledgeBaseResponse = response
            .json()
            .await
            .map_err(|e| QaClientError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(body.into())
    }
}

#[derive(Serialize)]
struct QueryKnowledgeBaseRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct QueryKnowledgeBaseResponse {
    #[serde(default)]
    answers: Vec<AnswerEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerEntry {
    #[serde(default)]
    answer: String,
    confidence_score: Option<f64>,
    source: Option<String>,
}

impl From<QueryKnowledgeBaseResponse> for KnowledgeBaseAnswers {
    fn from(response: QueryKnowledgeBaseResponse) -> Self {
        Self {
            answers: response
                .answers
                .into_iter()
                .map(|entry| KnowledgeBaseAnswer {
                    answer: entry.answer,
                    confidence: entry.confidence_score,
                    source: entry.source,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: String,
}

/// Prefer the service's `{"error": {"code", "message"}}` envelope, then the raw
/// body, then the status reason.
fn service_error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return match envelope.error.code {
            Some(code) => format!("{}: {}", code, envelope.error.message),
            None => envelope.error.message,
        };
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
