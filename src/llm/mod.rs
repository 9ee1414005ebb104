//! Inference gateway
//!
//! A text-in/text-out client keyed by a [`Mode`]. Providers live under
//! [`adapters`]; the process-wide mode selector lives in [`modal`].

pub mod adapters;
pub mod modal;

pub use adapters::{create_adapter, Adapter, GatewayError};
pub use modal::{ModalGateway, ModeSession};

use std::fmt;

/// Which capability answers a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Natural language → draft SQL
    Generation,
    /// Draft SQL + selections → repaired SQL + comments
    Validation,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Generation => write!(f, "generation"),
            Mode::Validation => write!(f, "validation"),
        }
    }
}

/// Model name per mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoster {
    pub generation: String,
    pub validation: String,
}

impl ModelRoster {
    pub fn new(generation: &str, validation: &str) -> Self {
        Self {
            generation: generation.trim().to_string(),
            validation: validation.trim().to_string(),
        }
    }

    pub fn model_for(&self, mode: Mode) -> &str {
        match mode {
            Mode::Generation => &self.generation,
            Mode::Validation => &self.validation,
        }
    }
}

impl Default for ModelRoster {
    fn default() -> Self {
        Self::new("sqls", "checker")
    }
}

/// Text generation capability
///
/// Implementations must not retry internally and must bound every call by
/// a timeout; retry policy belongs to callers.
pub trait InferenceGateway: Send + Sync {
    /// Run `prompt` against the capability selected by `mode`
    fn invoke(&self, mode: Mode, prompt: &str) -> Result<String, GatewayError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
