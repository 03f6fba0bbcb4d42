use crate::models::{AnswerRequest, AnswerResult};
use crate::AppState;
use anyhow::Context;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde_json::Value;
use service_core::error::AppError;

const CLIENT_NOT_CONFIGURED: &str =
    "QA service not configured. Check AI_SERVICE_ENDPOINT and AI_SERVICE_KEY.";
const PROJECT_NOT_CONFIGURED: &str =
    "QA project not configured. Check QA_PROJECT_NAME and QA_DEPLOYMENT_NAME.";
const BODY_TOO_LARGE: &str = "Request body is too large";

/// `POST /api/answer`: ask the knowledge base and relay its top answer.
#[tracing::instrument(skip(state, payload))]
pub async fn answer_question(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnswerResult>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected answer request body");
        // Body over the extractor's length limit.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(BODY_TOO_LARGE.to_string())
        } else {
            AnswerRequest::missing_question()
        }
    })?;
    let request = AnswerRequest::from_payload(&payload)?;

    let client = state
        .qa_clients
        .client()
        .ok_or_else(|| AppError::ConfigError(anyhow::anyhow!(CLIENT_NOT_CONFIGURED)))?;

    let (project_name, deployment_name) = state
        .project
        .resolve()
        .ok_or_else(|| AppError::ConfigError(anyhow::anyhow!(PROJECT_NOT_CONFIGURED)))?;

    tracing::info!(question = %request.question, "Answering question");

    let answers = client
        .get_answers(&request.question, project_name, deployment_name)
        .await
        .map_err(|e| {
            tracing::error!(
                error = ?e,
                project = %project_name,
                deployment = %deployment_name,
                "Error answering question"
            );
            e
        })
        .context("An error occurred while processing your question")?;

    if answers.answers.is_empty() {
        tracing::info!("No answers found for question");
        return Ok(Json(AnswerResult::no_answer()));
    }

    let result = AnswerResult::from_answers(answers);
    tracing::info!(confidence = result.confidence, "Answer found");

    Ok(Json(result))
}
