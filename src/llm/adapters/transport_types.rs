//! Transport types
//!
//! Error type and transport trait shared by every gateway implementation.

/// Inference gateway errors
///
/// The first three variants are the failures named by the gateway contract.
/// The remaining ones are still gateway failures from the pipeline's point of
/// view; they only carry more detail for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Request exceeded the configured timeout
    #[error("Inference timed out: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, TLS failure...
    #[error("Inference service unreachable: {0}")]
    Unreachable(String),

    /// Provider answered with no text
    #[error("Inference service returned an empty response")]
    EmptyResponse,

    /// HTTP error (non-2xx status)
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Provider envelope could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            GatewayError::Timeout(err.to_string())
        } else {
            GatewayError::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Json(err.to_string())
    }
}

impl From<ureq::Error> for GatewayError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => GatewayError::Http {
                status: code,
                message: response
                    .into_string()
                    .ok()
                    .map(|body| body.trim().to_string())
                    .filter(|body| !body.is_empty())
                    .unwrap_or_else(|| format!("HTTP {}", code)),
            },
            ureq::Error::Transport(err) => {
                let message = err.to_string();
                if err.kind() == ureq::ErrorKind::Io && message.contains("timed out") {
                    GatewayError::Timeout(message)
                } else {
                    GatewayError::Unreachable(message)
                }
            }
        }
    }
}

/// Synchronous HTTP transport
///
/// Abstraction over the HTTP client so adapters can be tested with
/// `FakeTransport`.
pub trait SyncTransport: Send + Sync {
    /// POST JSON request and return response body
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, GatewayError>;
}
