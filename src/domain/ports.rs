use crate::error::{SignerError, TransportError};
use async_trait::async_trait;
use std::collections::HashMap;

/// Hashing and signing capability backed by a cryptographic toolkit.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn hash(&self, content: &[u8]) -> Result<Vec<u8>, SignerError>;
    async fn sign(&self, content: &[u8]) -> Result<Vec<u8>, SignerError>;
    /// Serial of the certificate bound to the signing key, lowercase hex
    /// without `0x`. `None` when no such certificate is installed.
    async fn certificate_serial(&self) -> Result<Option<String>, SignerError>;
}

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: String,
    pub url: String,
    pub form: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    /// When false, a 3xx answer is returned as is instead of being followed.
    pub follow_redirects: bool,
}

/// A raw HTTP answer; interpreting the status is up to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

pub type SignerBox = Box<dyn Signer>;
pub type TransportBox = Box<dyn Transport>;
