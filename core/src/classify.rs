//! Turning a completed HTTP exchange into an `Outcome`.
//!
//! Codes in [200, 400) are successes and must carry a JSON object, which is
//! handed to the caller. Everything else is mapped through
//! `ApiStatus::from_status_code`; the error body still has to be a JSON
//! object and is logged, but it is not handed to the caller. An empty body
//! on either side is a server anomaly regardless of the code.

use crate::error::AttemptError;
use crate::http::{HttpRequest, HttpResponse, JsonObject};
use crate::sink::RequestLog;
use crate::status::{ApiStatus, Outcome};

pub(crate) fn interpret(
    request: &HttpRequest,
    response: &HttpResponse,
    log: RequestLog<'_>,
) -> Result<Outcome, AttemptError> {
    if (200..400).contains(&response.status) {
        let body = parse_object(&response.body)?;
        log.debug(|| {
            format!(
                "API response | method = {}; url = {}; responseCode = {}; res = {}",
                request.method,
                request.url,
                response.status,
                render(&body)
            )
        });
        Ok(Outcome::success(body))
    } else {
        let status = ApiStatus::from_status_code(response.status);
        let body = parse_object(&response.body)?;
        log.debug(|| {
            format!(
                "API response | responseCode = {}; res = {}",
                response.status,
                render(&body)
            )
        });
        Ok(Outcome::failure(status))
    }
}

fn parse_object(text: &str) -> Result<JsonObject, AttemptError> {
    if text.is_empty() {
        return Err(AttemptError::EmptyBody);
    }
    match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Object(object) => Ok(object),
        _ => Err(AttemptError::NotAnObject),
    }
}

pub(crate) fn render(body: &JsonObject) -> String {
    serde_json::Value::Object(body.clone()).to_string()
}
