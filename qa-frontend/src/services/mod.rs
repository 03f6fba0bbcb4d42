pub mod language_client;
pub mod metrics;
pub mod qa_client;

pub use language_client::LanguageQaClient;
pub use qa_client::{
    KnowledgeBaseAnswer, KnowledgeBaseAnswers, LanguageClientProvider, QaClientError,
    QaClientProvider, QuestionAnswering,
};
