use journal_service::{config::JournalConfig, jobs, services, startup::Application};
use service_core::observability::init_tracing;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = JournalConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);
    services::init_metrics();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting journal service"
    );

    let app = Application::build(config).await?;

    let shutdown = CancellationToken::new();
    jobs::spawn_jobs(app.state(), shutdown.clone());

    app.run_until_stopped().await?;

    shutdown.cancel();
    tracing::info!("Service shutdown complete");
    Ok(())
}
