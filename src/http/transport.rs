use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::debug;

use crate::error::HttpError;

use super::materialize::MaterializedRequest;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("mapload/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Performs one HTTP request. Implementations are shared by every in-flight
/// iteration and must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn perform(&self, request: MaterializedRequest) -> Result<TransportResponse, HttpError>;
}

/// Transport backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Builds the shared client. With `timeout`, every request (body read
    /// included) is bounded and expiry surfaces as [`HttpError::Timeout`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::BuildClientFailed`] when the TLS backend or client
    /// configuration cannot be initialized.
    pub fn new(timeout: Option<Duration>) -> Result<Self, HttpError> {
        let mut builder = Client::builder().user_agent(DEFAULT_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self { client, timeout })
    }

    fn timed_out(&self, err: &reqwest::Error) -> Option<HttpError> {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Some(HttpError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            Some(_) | None => None,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn perform(&self, request: MaterializedRequest) -> Result<TransportResponse, HttpError> {
        let headers = build_header_map(&request.headers)?;
        let mut builder = self
            .client
            .request(request.method, request.url.as_str())
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| {
                self.timed_out(&err)
                    .unwrap_or(HttpError::Transport { source: err })
            })?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|err| {
                self.timed_out(&err)
                    .unwrap_or(HttpError::ReadBody { source: err })
            })?;
        debug!("{} responded with status {}", request.url, status);

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_err| HttpError::InvalidHeader {
                name: name.clone(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_err| HttpError::InvalidHeader {
                name: name.clone(),
            })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
