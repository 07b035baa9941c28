//! Outbound provider abstractions.
//!
//! Trait-based seams around the three hosted services the journal
//! depends on: an LLM text API, an SMTP relay, and a vector-search
//! quote index. Each has a real implementation and a mock.

pub mod gemini;
pub mod mock;
pub mod quotes;
pub mod smtp;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => {
                tracing::warn!(error = %msg, "Provider not configured");
                AppError::ServiceUnavailable
            }
            ProviderError::InvalidRequest(msg) | ProviderError::InvalidRecipient(msg) => {
                AppError::BadRequest(anyhow::anyhow!(msg))
            }
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// Generation parameters for LLM requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,

    /// JSON schema for structured output.
    pub output_schema: Option<String>,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Result of one LLM round trip.
pub struct CompletionResponse {
    pub text: Option<String>,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub finish_reason: FinishReason,
}

/// Trait for LLM text generation providers.
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<CompletionResponse, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Outbound email message.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Receipt returned by an email provider on success.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub provider_id: Option<String>,
}

/// Trait for email delivery providers.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<SendReceipt, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;

    fn is_enabled(&self) -> bool;
}

/// A quote returned by the vector index.
#[derive(Debug, Clone)]
pub struct Quote {
    pub text: String,
    pub author: Option<String>,
    pub score: Option<f32>,
}

/// Trait for semantic quote lookup.
#[async_trait]
pub trait QuoteIndex: Send + Sync {
    /// Best-matching quotes for a free-text query, highest score first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Quote>, ProviderError>;

    fn is_enabled(&self) -> bool;
}
