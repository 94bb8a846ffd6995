use crate::domain::ports::{Signer, Transport, TransportRequest, TransportResponse};
use crate::error::{SignerError, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What a [`Signer`] call received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerCall {
    Hash(Vec<u8>),
    Sign(Vec<u8>),
    CertificateSerial,
}

/// A signer that answers with fixed values and records its inputs.
///
/// Clones share the same call log.
#[derive(Debug, Clone)]
pub struct InMemorySigner {
    digest: Vec<u8>,
    signature: Vec<u8>,
    serial: Option<String>,
    failure: Option<(i64, String)>,
    calls: Arc<Mutex<Vec<SignerCall>>>,
}

impl InMemorySigner {
    pub fn new(digest: &[u8], signature: &[u8], serial: Option<&str>) -> Self {
        Self {
            digest: digest.to_vec(),
            signature: signature.to_vec(),
            serial: serial.map(str::to_string),
            failure: None,
            calls: Arc::default(),
        }
    }

    /// A signer whose every call fails with the given toolkit error.
    pub fn failing(code: i64, text: impl Into<String>) -> Self {
        Self {
            failure: Some((code, text.into())),
            ..Self::new(b"", b"", None)
        }
    }

    pub async fn calls(&self) -> Vec<SignerCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: SignerCall) -> Result<(), SignerError> {
        self.calls.lock().await.push(call);
        match &self.failure {
            Some((code, text)) => Err(SignerError::Toolkit {
                code: *code,
                text: text.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for InMemorySigner {
    fn default() -> Self {
        Self::new(b"digest", b"signature", Some("0123abcd"))
    }
}

#[async_trait]
impl Signer for InMemorySigner {
    async fn hash(&self, content: &[u8]) -> Result<Vec<u8>, SignerError> {
        self.record(SignerCall::Hash(content.to_vec())).await?;
        Ok(self.digest.clone())
    }

    async fn sign(&self, content: &[u8]) -> Result<Vec<u8>, SignerError> {
        self.record(SignerCall::Sign(content.to_vec())).await?;
        Ok(self.signature.clone())
    }

    async fn certificate_serial(&self) -> Result<Option<String>, SignerError> {
        self.record(SignerCall::CertificateSerial).await?;
        Ok(self.serial.clone())
    }
}

/// A transport that replays queued responses and records every request.
///
/// Clones share the same queue and log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    responses: Arc<Mutex<VecDeque<Result<TransportResponse, String>>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON answer with the given status.
    pub async fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_response(TransportResponse {
            status,
            headers: HashMap::new(),
            body: body.to_string().into_bytes(),
        })
        .await;
    }

    /// Queues a JSON redirect answer carrying a `Location` header.
    pub async fn push_redirect(&self, status: u16, location: &str, body: serde_json::Value) {
        let headers = HashMap::from([("location".to_string(), location.to_string())]);
        self.push_response(TransportResponse {
            status,
            headers,
            body: body.to_string().into_bytes(),
        })
        .await;
    }

    pub async fn push_response(&self, response: TransportResponse) {
        self.responses.lock().await.push_back(Ok(response));
    }

    /// Queues a connection-level failure.
    pub async fn push_network_error(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    pub async fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().await.push(request);
        match self.responses.lock().await.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Network(message.into())),
            None => Err(TransportError::Network("no response queued".into())),
        }
    }
}
