//! The transport boundary and its two implementations.
//!
//! # Design
//! The core never opens sockets itself. A `Transport` takes a `WireRequest`
//! and returns the raw status, headers and body, or a `TransportError`. Status
//! codes are data at this layer; the executor decides what a 4xx means.
//!
//! `ReqwestTransport` is fully async. Dropping its future (which is what
//! `PendingRequest::cancel` does) drops the in-flight hyper call, and the
//! connection is closed rather than returned to the pool.
//!
//! `UreqTransport` runs the blocking ureq call on tokio's blocking pool. A
//! blocking call cannot be interrupted, so dropping its future only stops
//! waiting; the worker and its socket live until the request or agent timeout
//! fires. The agent therefore always has a timeout, `DEFAULT_TIMEOUT` unless
//! configured otherwise.
//!
//! Neither transport caps the response body size.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{Verb, WireRequest, WireResponse};

/// Agent-wide timeout used by `UreqTransport::new`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues wire requests. Implementations must be safe to share across tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Async transport backed by a `reqwest::Client`.
///
/// Cancelling a request closes its connection. Timeouts come from the
/// request, or from the client when the request sets none.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Client with no default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose timeout applies when a request sets none.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let method = match request.method {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_builder() {
        TransportError::InvalidRequest(e.to_string())
    } else {
        TransportError::Io(e.to_string())
    }
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// 4xx/5xx responses are returned as data rather than `Err`, so the executor
/// sees the status and body.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent with `DEFAULT_TIMEOUT`.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Agent whose global timeout applies when a request sets none.
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || send_blocking(&agent, request))
            .await
            .map_err(|e| TransportError::Io(format!("transport worker failed: {e}")))?
    }
}

fn send_blocking(agent: &ureq::Agent, request: WireRequest) -> Result<WireResponse, TransportError> {
    let url = request.url.as_str();
    let timeout = request.timeout;

    let result = match request.method {
        Verb::Get => {
            let mut builder = agent.get(url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if timeout.is_some() {
                builder = builder.config().timeout_global(timeout).build();
            }
            builder.call()
        }
        Verb::Post => {
            let mut builder = agent.post(url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if timeout.is_some() {
                builder = builder.config().timeout_global(timeout).build();
            }
            match request.body {
                Some(body) => builder.send(&body[..]),
                None => builder.send_empty(),
            }
        }
    };

    let mut response = result.map_err(map_ureq_error)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(map_ureq_error)?;

    Ok(WireResponse {
        status,
        headers,
        body,
    })
}

fn map_ureq_error(e: ureq::Error) -> TransportError {
    match e {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(io) => match io.kind() {
            std::io::ErrorKind::TimedOut => TransportError::Timeout,
            std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::AddrNotAvailable => {
                TransportError::Connect(io.to_string())
            }
            _ => TransportError::Io(io.to_string()),
        },
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
            TransportError::Connect(e.to_string())
        }
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => TransportError::InvalidRequest(e.to_string()),
        other => TransportError::Io(other.to_string()),
    }
}
