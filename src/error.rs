use thiserror::Error;

/// Failures raised by the cryptographic toolkit adapter.
#[derive(Error, Debug)]
pub enum SignerError {
    /// The toolkit exited with a non-zero status.
    #[error("{code}: {text}")]
    Toolkit { code: i64, text: String },
    /// No installed certificate is bound to the signing container.
    #[error("no certificate is bound to the signing container")]
    CertificateNotFound,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignerError {
    /// Builds a toolkit error that carries no parsed code.
    pub fn uncoded(text: impl Into<String>) -> Self {
        Self::Toolkit {
            code: -1,
            text: text.into(),
        }
    }

    /// The toolkit error code, `-1` when none was reported.
    pub fn code(&self) -> i64 {
        match self {
            Self::Toolkit { code, .. } => *code,
            _ => -1,
        }
    }
}

/// Failures of the HTTP round trip itself, before any body is interpreted.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP status {status}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The single error family surfaced by every payment gateway operation.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The bank answered with `Success: false`.
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },
    #[error("signing failed: {0}")]
    Signing(#[from] SignerError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
