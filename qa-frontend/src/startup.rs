//! Router construction and server lifecycle.

use crate::config::QaFrontendConfig;
use crate::handlers::{answer::answer_question, app::health_check, metrics::metrics};
use crate::services::LanguageClientProvider;
use crate::AppState;
use axum::{
    http::{header, HeaderName, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware, REQUEST_ID_HEADER},
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let static_files = ServeDir::new(static_dir);

    Router::new()
        .route("/api/answer", post(answer_question))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route_layer(from_fn(metrics_middleware))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .fallback_service(static_files)
        .with_state(state)
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application against the configured question-answering service.
    pub async fn build(
        config: QaFrontendConfig,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self, AppError> {
        let provider = LanguageClientProvider::new(config.language_service.clone())?;

        let mut state = AppState::new(Arc::new(provider), config.project.clone());
        if let Some(handle) = metrics {
            state = state.with_metrics(handle);
        }

        Self::build_with_state(&config, state).await
    }

    /// Build with a caller-supplied state, e.g. a stub backend.
    pub async fn build_with_state(
        config: &QaFrontendConfig,
        state: AppState,
    ) -> Result<Self, AppError> {
        if !config.static_dir.join("index.html").is_file() {
            tracing::warn!(
                static_dir = %config.static_dir.display(),
                "index.html not found in static directory"
            );
        }

        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            host = %config.common.host,
            port,
            static_dir = %config.static_dir.display(),
            "qa-frontend bound"
        );

        Ok(Self {
            port,
            listener,
            router: build_router(state, &config.static_dir),
        })
    }

    /// The port the server is listening on (useful when configured with port 0).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
