//! Application startup and lifecycle management.

use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::JournalConfig;
use crate::services::{
    Database, EmailProvider, GeminiTextProvider, HttpQuoteIndex, InsightService, MockEmailProvider,
    MockQuoteIndex, MockTextProvider, QuoteIndex, SmtpProvider, TextProvider,
};
use crate::{build_router, AppState};

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration: connect and
    /// migrate the database, wire providers, bind the listener
    /// (port 0 = random port for testing).
    pub async fn build(config: JournalConfig) -> Result<Self, AppError> {
        let db = Database::connect(&config.database).await.map_err(|e| {
            tracing::error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;

        db.migrate().await.map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;

        let llm: Arc<dyn TextProvider> = if config.llm.api_key.is_empty() {
            tracing::info!("LLM API key not set, using mock text provider");
            Arc::new(MockTextProvider::new(true))
        } else {
            tracing::info!(model = %config.llm.model, "Gemini text provider initialized");
            Arc::new(GeminiTextProvider::new(config.llm.clone()))
        };

        let email: Arc<dyn EmailProvider> = if config.smtp.enabled {
            match SmtpProvider::new(config.smtp.clone()) {
                Ok(provider) => {
                    tracing::info!("SMTP email provider initialized");
                    Arc::new(provider)
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize SMTP provider: {}. Using mock.", e);
                    Arc::new(MockEmailProvider::new(true))
                }
            }
        } else {
            tracing::info!("SMTP provider disabled, using mock email provider");
            Arc::new(MockEmailProvider::new(true))
        };

        let quotes: Arc<dyn QuoteIndex> = if config.quotes.enabled {
            tracing::info!(collection = %config.quotes.collection, "Quote index initialized");
            Arc::new(HttpQuoteIndex::new(config.quotes.clone()))
        } else {
            tracing::info!("Quote index disabled, newsletters use the fallback quote");
            Arc::new(MockQuoteIndex::new(false))
        };

        let state = AppState {
            config: config.clone(),
            db,
            insight: InsightService::new(llm),
            email,
            quotes,
        };

        let addr: SocketAddr = format!("{}:{}", config.common.host, config.common.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid bind address: {}", e)))?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "Journal service listening");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the application state for sharing with background jobs.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the HTTP server until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
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
