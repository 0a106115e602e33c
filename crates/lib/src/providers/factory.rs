//! # AI Provider Factory
//!
//! Builds the configured generation service. Consumers (the CLI, tests)
//! go through here so provider selection stays in one place.

use crate::{
    config::AiConfig,
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
};
use tracing::info;

/// Creates the provider described by `config`.
pub fn create_provider(config: &AiConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    let api_url = config.endpoint().ok_or_else(|| {
        PromptError::MissingAiProvider(format!(
            "no api_url configured for provider '{}'",
            config.provider
        ))
    })?;

    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty())
                .ok_or(PromptError::MissingApiKey)?;
            info!(
                "Configuring Gemini provider for model '{}' at {}",
                config.model_name, api_url
            );
            Box::new(GeminiProvider::new(api_url, api_key)?.with_temperature(config.temperature))
        }
        "local" => {
            info!(
                "Configuring local AI provider for model '{}' at {}",
                config.model_name, api_url
            );
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone(),
                Some(config.model_name.clone()),
            )?
            .with_temperature(config.temperature))
        }
        other => {
            return Err(PromptError::MissingAiProvider(format!(
                "unsupported provider '{other}'"
            )))
        }
    };

    Ok(provider)
}
