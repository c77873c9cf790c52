use assist_service::config::AssistConfig;
use assist_service::services::init_metrics;
use assist_service::startup::Application;
use assist_core::observability::init_tracing;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), assist_core::error::AppError> {
    let config = AssistConfig::load()?;

    init_tracing(&config.common.log_level);
    init_metrics();

    tracing::info!(port = config.common.port, "Starting assist-service");

    let application = Application::build(config).await?;

    tokio::select! {
        result = application.run_until_stopped() => result?,
        _ = shutdown_signal() => {}
    }

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
