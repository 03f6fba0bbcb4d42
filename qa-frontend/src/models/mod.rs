pub mod answer;

pub use answer::{AnswerRequest, AnswerResult, MISSING_CONFIDENCE, NO_ANSWER_MESSAGE};
