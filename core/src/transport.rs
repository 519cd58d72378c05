//! The seam between the executor and the network.
//!
//! # Design
//! A `Transport` executes one `HttpRequest` and returns the status code and
//! the fully read body. It never interprets status codes; 4xx and 5xx are
//! data, and only failures to complete the exchange are errors.
//! Bodies are decoded as UTF-8 with invalid sequences replaced, so a badly
//! encoded payload surfaces as a parse failure rather than an I/O failure.
//! `UreqTransport` is the production implementation. Any
//! `Fn(&HttpRequest) -> Result<HttpResponse, TransportError>` closure is a
//! transport too, which is how tests script responses and faults.

use ureq::http::{HeaderName, HeaderValue};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::config::{Timeouts, MAX_RESPONSE_BODY};
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking transport over a ureq `Agent`.
///
/// The agent is configured so non-2xx responses come back as data rather
/// than `Err`, leaving status interpretation to the executor.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    max_body: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeouts(Timeouts::default())
    }

    pub fn with_timeouts(timeouts: Timeouts) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(timeouts.connect))
            .timeout_recv_response(Some(timeouts.read))
            .timeout_recv_body(Some(timeouts.read))
            .build()
            .new_agent();
        Self {
            agent,
            max_body: MAX_RESPONSE_BODY,
        }
    }

    /// Bodies larger than `bytes` fail with `TransportError::BodyTooLarge`.
    pub fn max_response_body(mut self, bytes: u64) -> Self {
        self.max_body = bytes;
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => send_without_body(self.agent.get(url), request),
            HttpMethod::Delete => send_without_body(self.agent.delete(url), request),
            HttpMethod::Head => send_without_body(self.agent.head(url), request),
            HttpMethod::Options => send_without_body(self.agent.options(url), request),
            HttpMethod::Post => send_with_body(self.agent.post(url), request),
            HttpMethod::Put => send_with_body(self.agent.put(url), request),
            HttpMethod::Patch => send_with_body(self.agent.patch(url), request),
        };

        // The response owns the connection; dropping it at the end of this
        // scope hands the connection back to the agent or closes it.
        let mut response = result?;
        let status = response.status().as_u16();
        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.max_body)
            .read_to_vec()?;

        Ok(HttpResponse {
            status,
            body: decode_body(&bytes),
        })
    }
}

fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<Body>, ureq::Error> {
    let builder = apply_headers(builder, &request.headers);
    match &request.body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<Body>, ureq::Error> {
    let builder = apply_headers(builder, &request.headers);
    match &request.body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn decode_body(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Headers that are not valid on the wire are skipped instead of failing the
/// whole request.
fn apply_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
) -> RequestBuilder<B> {
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(header_name), Ok(header_value)) => {
                builder = builder.header(header_name, header_value);
            }
            _ => {
                tracing::debug!(header = %name, "skipping header that cannot be sent");
            }
        }
    }
    builder
}
