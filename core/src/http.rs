//! Request and response types for the executor.
//!
//! # Design
//! `ApiRequest` is what callers hand to the executor: a typed method, a URL,
//! a header map, an optional JSON object body and the per-request options.
//! Before it reaches a transport it is lowered into `HttpRequest`, which
//! describes the wire request as plain data (owned `String`s and `Vec`s), so
//! any `Transport` can execute it without knowing about JSON or sinks.
//! `HttpResponse` is the plain-data answer a transport hands back.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{AttemptError, ParseMethodError};
use crate::sink::LogSink;

/// A JSON object, the only body shape accepted on either side of the wire.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let verb = s.trim();
        if verb.is_empty() {
            return Err(ParseMethodError::Empty);
        }
        match verb.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(ParseMethodError::Unknown(verb.to_string())),
        }
    }
}

/// One request as submitted to an `Executor`.
///
/// Headers are kept in a map so names are unique. The body, when present,
/// is written as JSON text and tagged `content-type: application/json`
/// unless the caller already set a content type.
#[derive(Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<JsonObject>,
    /// Pause the background lane after this attempt before starting the next.
    pub throttle: bool,
    pub log_sink: Option<Arc<dyn LogSink>>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            throttle: false,
            log_sink: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn json(mut self, body: JsonObject) -> Self {
        self.body = Some(body);
        self
    }

    pub fn throttle(mut self, throttle: bool) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn log_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.log_sink = Some(Arc::new(sink));
        self
    }

    /// Lower into the wire description handed to a `Transport`.
    pub(crate) fn to_http(&self) -> Result<HttpRequest, AttemptError> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let body = match &self.body {
            Some(body) => {
                let text = serde_json::to_string(body).map_err(AttemptError::Encode)?;
                if !headers
                    .iter()
                    .any(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                {
                    headers.push(("content-type".to_string(), "application/json".to_string()));
                }
                Some(text)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            body,
        })
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("throttle", &self.throttle)
            .field("log_sink", &self.log_sink.is_some())
            .finish()
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data, body already read in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(" Patch ".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!("DELETE".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
    }

    #[test]
    fn method_rejects_empty_and_unknown_verbs() {
        assert!(matches!("".parse::<HttpMethod>(), Err(ParseMethodError::Empty)));
        assert!(matches!(
            "FETCH".parse::<HttpMethod>(),
            Err(ParseMethodError::Unknown(verb)) if verb == "FETCH"
        ));
    }

    #[test]
    fn request_without_body_writes_no_payload() {
        let req = ApiRequest::new(HttpMethod::Get, "https://x/y")
            .header("authorization", "token")
            .to_http()
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://x/y");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("authorization".to_string(), "token".to_string())]
        );
    }

    #[test]
    fn request_with_body_is_json_text_with_content_type() {
        let req = ApiRequest::new(HttpMethod::Post, "https://x/y")
            .json(object(json!({"a": 1})))
            .to_http()
            .unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"a":1}"#));
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
    }

    #[test]
    fn caller_content_type_is_kept() {
        let req = ApiRequest::new(HttpMethod::Put, "https://x/y")
            .header("Content-Type", "application/vnd.api+json")
            .json(object(json!({})))
            .to_http()
            .unwrap();
        let content_types: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(content_types[0].1, "application/vnd.api+json");
    }

    #[test]
    fn repeated_header_names_keep_the_last_value() {
        let req = ApiRequest::new(HttpMethod::Get, "https://x/y")
            .headers([("x-id", "1"), ("x-id", "2")]);
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers["x-id"], "2");
    }
}
