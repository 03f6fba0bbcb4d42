use dotenvy::dotenv;
use qa_frontend::config::QaFrontendConfig;
use qa_frontend::services::metrics::init_metrics;
use qa_frontend::startup::Application;
use service_core::observability::logging::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = QaFrontendConfig::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "qa-frontend",
        configuration.common.log_level(),
        configuration.otlp_endpoint.as_deref(),
    )?;

    let metrics = init_metrics()?;

    let address = configuration.common.address();
    let app = Application::build(configuration, Some(metrics)).await?;

    info!("Starting qa-frontend on {}", address);
    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
