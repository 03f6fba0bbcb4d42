pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use config::ProjectSettings;
use metrics_exporter_prometheus::PrometheusHandle;
use services::QaClientProvider;
use std::sync::Arc;

/// Shared application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub qa_clients: Arc<dyn QaClientProvider>,
    pub project: Arc<ProjectSettings>,
    /// Present when a Prometheus recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(qa_clients: Arc<dyn QaClientProvider>, project: ProjectSettings) -> Self {
        Self {
            qa_clients,
            project: Arc::new(project),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
