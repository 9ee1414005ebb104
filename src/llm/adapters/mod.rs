//! Gateway adapters
//!
//! Provider implementations of [`InferenceGateway`]. Adapters are stateless
//! with respect to mode: the mode arrives with every call.

pub mod factory;
pub mod ollama;
pub mod ollama_parse;
pub mod stub;
pub mod transport;
pub mod transport_fake;
pub mod transport_types;
pub mod transport_ureq;

pub use factory::create_adapter;
pub use transport::{GatewayError, SyncTransport};

use crate::llm::{InferenceGateway, Mode};

/// Adapter enum — concrete type for all providers
///
/// Lets callers hold one provider-agnostic type without boxing.
#[derive(Debug)]
pub enum Adapter {
    Ollama(ollama::OllamaAdapter),
    Stub(stub::StubAdapter),
}

impl InferenceGateway for Adapter {
    fn invoke(&self, mode: Mode, prompt: &str) -> Result<String, GatewayError> {
        match self {
            Adapter::Ollama(a) => a.invoke(mode, prompt),
            Adapter::Stub(a) => a.invoke(mode, prompt),
        }
    }

    fn provider_name(&self) -> &str {
        match self {
            Adapter::Ollama(a) => a.provider_name(),
            Adapter::Stub(a) => a.provider_name(),
        }
    }
}
