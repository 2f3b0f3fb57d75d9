//! Executing an `HttpRequest` over the network.
//!
//! # Design
//! `Transport` is the single seam between the pure client and real I/O.
//! Implementations perform exactly one attempt and report every non-HTTP
//! failure (DNS, refused connection, timeout, truncated body) as
//! `ApiError::NetworkUnavailable`. HTTP error statuses are *not* failures
//! here; they come back as data for `ApiClient::parse_*` to classify.

use std::time::Duration;

use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_timeouts(config.connect_timeout, config.read_timeout, config.write_timeout)
    }

    pub fn with_timeouts(connect: Duration, read: Duration, write: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(connect))
            .timeout_send_request(Some(write))
            .timeout_send_body(Some(write))
            .timeout_recv_response(Some(read))
            .timeout_recv_body(Some(read))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&path), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&path), &headers).call(),
            HttpMethod::Post => {
                send_with_body(with_headers(self.agent.post(&path), &headers), body.as_deref())
            }
            HttpMethod::Put => {
                send_with_body(with_headers(self.agent.put(&path), &headers), body.as_deref())
            }
        };

        let mut response = result.map_err(|e| unavailable(method, &path, e))?;
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
            .read_to_string()
            .map_err(|e| unavailable(method, &path, e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn unavailable(method: HttpMethod, path: &str, err: ureq::Error) -> ApiError {
    warn!(%method, %path, error = %err, "transport failure");
    ApiError::NetworkUnavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_is_network_unavailable() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = UreqTransport::with_timeouts(
            Duration::from_secs(2),
            Duration::from_secs(2),
            Duration::from_secs(2),
        );
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: format!("http://{addr}/api/health"),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(request).unwrap_err();
        assert!(matches!(err, ApiError::NetworkUnavailable(_)));
    }
}
