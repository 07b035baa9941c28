//! Mock LLM provider for tests and key-less deployments.

use super::{CompletionResponse, FinishReason, GenerationParams, ProviderError, TextProvider};
use async_trait::async_trait;

/// Structured requests get a fixed JSON envelope that satisfies every
/// schema the insight service asks for; plain requests echo the prompt.
const STRUCTURED_ENVELOPE: &str = r#"{"feedback":"Mock feedback: keep showing up.","mood":"steady","steps":["Mock step one","Mock step two","Mock step three"]}"#;

pub struct MockTextProvider {
    enabled: bool,
    canned: Option<String>,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            canned: None,
        }
    }

    /// Always answer with the given text, schema or not.
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            enabled: true,
            canned: Some(text.into()),
        }
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<CompletionResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        let text = match &self.canned {
            Some(canned) => canned.clone(),
            None if params.output_schema.is_some() => STRUCTURED_ENVELOPE.to_string(),
            None => format!("Mock response for: {}", prompt),
        };

        Ok(CompletionResponse {
            text: Some(text),
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: 10,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }
}
