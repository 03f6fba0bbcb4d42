//! Request and response bodies for `POST /api/answer`.

use crate::services::qa_client::{KnowledgeBaseAnswer, KnowledgeBaseAnswers};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;
use validator::{Validate, ValidationErrors};

/// Returned with HTTP 200 when the knowledge base has no candidate answer.
pub const NO_ANSWER_MESSAGE: &str =
    "I could not find an answer to your question in the knowledge base.";

/// Confidence reported when the backend omits a score.
pub const MISSING_CONFIDENCE: f64 = 0.0;

const MISSING_QUESTION_MESSAGE: &str = "Missing 'question' field in request body";
const QUESTION_NOT_STRING_MESSAGE: &str = "'question' must be a string";

/// A validated question. The text is already trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, message = "Question cannot be empty"))]
    pub question: String,
}

impl AnswerRequest {
    /// Extract and validate `question` from a decoded JSON body.
    pub fn from_payload(payload: &Value) -> Result<Self, AppError> {
        let question = match payload.get("question") {
            None | Some(Value::Null) => {
                return Err(AppError::BadRequest(MISSING_QUESTION_MESSAGE.to_string()));
            }
            Some(Value::String(question)) => question.trim().to_string(),
            Some(_) => {
                return Err(AppError::BadRequest(QUESTION_NOT_STRING_MESSAGE.to_string()));
            }
        };

        let request = Self { question };
        request
            .validate()
            .map_err(|errors| AppError::BadRequest(first_message(&errors)))?;

        Ok(request)
    }

    /// Error for bodies that are not JSON at all.
    pub fn missing_question() -> AppError {
        AppError::BadRequest(MISSING_QUESTION_MESSAGE.to_string())
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field_errors| field_errors.iter())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

/// Response body for a successful lookup, including the "no answer" case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub confidence: f64,
    /// Omitted when the chosen answer has no source; empty for [`AnswerResult::no_answer`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl AnswerResult {
    pub fn no_answer() -> Self {
        Self {
            answer: NO_ANSWER_MESSAGE.to_string(),
            confidence: MISSING_CONFIDENCE,
            sources: Some(Vec::new()),
        }
    }

    /// Keep only the backend's top-ranked candidate and at most its one source.
    /// Ties in confidence are not re-ranked.
    pub fn from_answers(answers: KnowledgeBaseAnswers) -> Self {
        answers
            .answers
            .into_iter()
            .next()
            .map(Self::from)
            .unwrap_or_else(Self::no_answer)
    }
}

impl From<KnowledgeBaseAnswer> for AnswerResult {
    fn from(answer: KnowledgeBaseAnswer) -> Self {
        Self {
            answer: answer.answer,
            confidence: answer.confidence.unwrap_or(MISSING_CONFIDENCE),
            sources: answer
                .source
                .filter(|source| !source.is_empty())
                .map(|source| vec![source]),
        }
    }
}
