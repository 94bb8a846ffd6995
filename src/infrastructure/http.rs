use crate::domain::ports::{Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTPS transport over `reqwest`.
///
/// Holds one client that follows redirects and one that does not, so a
/// request can ask to see a 3xx answer as is.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    following: Client,
    direct: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let following = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(Box::new(e)))?;
        let direct = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| TransportError::Network(Box::new(e)))?;
        Ok(Self { following, direct })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::Network(Box::new(e)))?;
        let client = if request.follow_redirects {
            &self.following
        } else {
            &self.direct
        };

        let mut builder = client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = builder.form(&request.form);

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(Box::new(e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(Box::new(e)))?
            .to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
