#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use qa_frontend::config::{ProjectSettings, QaFrontendConfig};
use qa_frontend::services::{
    KnowledgeBaseAnswer, KnowledgeBaseAnswers, QaClientError, QaClientProvider, QuestionAnswering,
};
use qa_frontend::startup::{build_router, Application};
use qa_frontend::AppState;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body>qa test page</body></html>";
pub const MAIN_JS: &str = "console.log('qa');";

/// What the stub backend does when asked.
#[derive(Clone)]
pub enum StubReply {
    Answers(Vec<KnowledgeBaseAnswer>),
    Fail(String),
}

/// Deterministic in-process backend.
pub struct StubBackend {
    reply: StubReply,
    calls: AtomicUsize,
    last_call: Mutex<Option<(String, String, String)>>,
}

impl StubBackend {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        })
    }

    pub fn answering(answers: Vec<KnowledgeBaseAnswer>) -> Arc<Self> {
        Self::new(StubReply::Answers(answers))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(StubReply::Fail(message.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(question, project, deployment)` of the most recent call.
    pub fn last_call(&self) -> Option<(String, String, String)> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionAnswering for StubBackend {
    async fn get_answers(
        &self,
        question: &str,
        project_name: &str,
        deployment_name: &str,
    ) -> Result<KnowledgeBaseAnswers, QaClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some((
            question.to_string(),
            project_name.to_string(),
            deployment_name.to_string(),
        ));

        match &self.reply {
            StubReply::Answers(answers) => Ok(KnowledgeBaseAnswers {
                answers: answers.clone(),
            }),
            StubReply::Fail(message) => Err(QaClientError::Network(message.clone())),
        }
    }
}

/// Hands out the same stub on every request, or nothing.
pub struct StubProvider {
    backend: Option<Arc<StubBackend>>,
}

impl StubProvider {
    pub fn with(backend: Arc<StubBackend>) -> Arc<Self> {
        Arc::new(Self {
            backend: Some(backend),
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self { backend: None })
    }
}

impl QaClientProvider for StubProvider {
    fn client(&self) -> Option<Arc<dyn QuestionAnswering>> {
        self.backend
            .clone()
            .map(|backend| backend as Arc<dyn QuestionAnswering>)
    }
}

pub fn candidate(answer: &str, confidence: Option<f64>, source: Option<&str>) -> KnowledgeBaseAnswer {
    KnowledgeBaseAnswer {
        answer: answer.to_string(),
        confidence,
        source: source.map(str::to_string),
    }
}

pub fn test_project() -> ProjectSettings {
    ProjectSettings::new("faq-project", "production")
}

/// Temporary static directory with an index page and one script.
pub fn static_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_file(dir.path(), "index.html", INDEX_HTML);
    write_file(dir.path(), "main.js", MAIN_JS);
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    let mut file = std::fs::File::create(dir.join(name)).expect("Failed to create file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write file");
}

/// Router plus the temp dir that must outlive it.
pub struct TestRouter {
    pub router: Router,
    pub static_dir: TempDir,
}

impl TestRouter {
    pub fn new(provider: Arc<dyn QaClientProvider>, project: ProjectSettings) -> Self {
        let static_dir = static_dir();
        let router = build_router(AppState::new(provider, project), static_dir.path());
        Self { router, static_dir }
    }

    pub fn with_backend(backend: Arc<StubBackend>) -> Self {
        Self::new(StubProvider::with(backend), test_project())
    }

    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// POST a raw JSON body to `/api/answer`.
    pub async fn ask_raw(&self, body: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/answer")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn ask(&self, question: &str) -> (StatusCode, Value) {
        self.ask_raw(&serde_json::json!({ "question": question }).to_string())
            .await
    }
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// A running server on a random port.
pub struct TestApp {
    pub address: String,
    pub static_dir: TempDir,
}

impl TestApp {
    pub async fn spawn(state: AppState) -> Self {
        let static_dir = static_dir();
        let config = QaFrontendConfig {
            common: CoreConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                debug: false,
            },
            language_service: Default::default(),
            project: (*state.project).clone(),
            static_dir: static_dir.path().to_path_buf(),
            otlp_endpoint: None,
        };

        let app = Application::build_with_state(&config, state)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let client = http_client();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            static_dir,
        }
    }

    pub fn client(&self) -> reqwest::Client {
        http_client()
    }
}

/// HTTP client for talking to local test servers, bypassing any proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build HTTP client")
}
