//! Adapter factory
//!
//! Creates gateway adapters from the `[llm]` configuration section.

use crate::config::LlmConfig;
use crate::llm::adapters::ollama::OllamaAdapter;
use crate::llm::adapters::stub::StubAdapter;
use crate::llm::adapters::{Adapter, GatewayError};
use crate::llm::ModelRoster;
use tracing::info;

/// Create adapter from config
pub fn create_adapter(config: &LlmConfig) -> Result<Adapter, GatewayError> {
    if config.timeout_secs == 0 {
        return Err(GatewayError::Configuration(
            "timeout_secs must be greater than 0".to_string(),
        ));
    }

    match config.provider.as_str() {
        "ollama" => {
            let roster = ModelRoster::new(&config.generation_model, &config.validation_model);
            if roster.generation.is_empty() || roster.validation.is_empty() {
                return Err(GatewayError::Configuration(
                    "generation_model and validation_model must be set".to_string(),
                ));
            }
            info!(
                host = %config.host,
                port = config.port,
                generation_model = %roster.generation,
                validation_model = %roster.validation,
                "Using Ollama inference gateway"
            );
            Ok(Adapter::Ollama(OllamaAdapter::new(
                config.host.clone(),
                config.port,
                roster,
                config.timeout_secs,
            )))
        }
        "stub" => {
            info!("Using stub inference gateway");
            Ok(Adapter::Stub(StubAdapter::new()))
        }
        other => Err(GatewayError::Configuration(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}
