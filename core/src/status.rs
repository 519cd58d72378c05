//! The closed set of outcomes a request can end in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http::JsonObject;

/// Terminal status of one request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "ERROR_BAD_REQUEST")]
    ErrorBadRequest,
    #[serde(rename = "ERROR_UNAUTHORIZED")]
    ErrorUnauthorized,
    #[serde(rename = "ERROR_PAYMENT_REQUIRED")]
    ErrorPaymentRequired,
    #[serde(rename = "ERROR_FORBIDDEN")]
    ErrorForbidden,
    #[serde(rename = "ERROR_NOT_FOUND")]
    ErrorNotFound,
    #[serde(rename = "ERROR_RATE_LIMIT")]
    ErrorRateLimit,
    #[serde(rename = "ERROR_SERVER")]
    ErrorServer,
    #[serde(rename = "ERROR_NETWORK")]
    ErrorNetwork,
    #[serde(rename = "ERROR_UNKNOWN")]
    ErrorUnknown,
}

impl ApiStatus {
    /// Status for a response code outside the success range [200, 400).
    pub fn from_status_code(code: u16) -> Self {
        match code {
            400 => ApiStatus::ErrorBadRequest,
            401 => ApiStatus::ErrorUnauthorized,
            402 => ApiStatus::ErrorPaymentRequired,
            403 => ApiStatus::ErrorForbidden,
            404 => ApiStatus::ErrorNotFound,
            429 => ApiStatus::ErrorRateLimit,
            500..=599 => ApiStatus::ErrorServer,
            _ => ApiStatus::ErrorUnknown,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiStatus::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiStatus::Success => "SUCCESS",
            ApiStatus::ErrorBadRequest => "ERROR_BAD_REQUEST",
            ApiStatus::ErrorUnauthorized => "ERROR_UNAUTHORIZED",
            ApiStatus::ErrorPaymentRequired => "ERROR_PAYMENT_REQUIRED",
            ApiStatus::ErrorForbidden => "ERROR_FORBIDDEN",
            ApiStatus::ErrorNotFound => "ERROR_NOT_FOUND",
            ApiStatus::ErrorRateLimit => "ERROR_RATE_LIMIT",
            ApiStatus::ErrorServer => "ERROR_SERVER",
            ApiStatus::ErrorNetwork => "ERROR_NETWORK",
            ApiStatus::ErrorUnknown => "ERROR_UNKNOWN",
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a completion callback receives: a status and, on success only, the
/// parsed response object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    status: ApiStatus,
    body: Option<JsonObject>,
}

impl Outcome {
    pub(crate) fn success(body: JsonObject) -> Self {
        Self {
            status: ApiStatus::Success,
            body: Some(body),
        }
    }

    pub(crate) fn failure(status: ApiStatus) -> Self {
        Self { status, body: None }
    }

    pub fn status(&self) -> ApiStatus {
        self.status
    }

    pub fn body(&self) -> Option<&JsonObject> {
        self.body.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn into_parts(self) -> (ApiStatus, Option<JsonObject>) {
        (self.status, self.body)
    }
}
