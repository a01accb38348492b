//! Outcome classification.
//!
//! The probe verifies connectivity, not correctness: any status that proves
//! the route exists counts as a pass. Only routing failures (405),
//! unexpected auth rejections, and unrecognised errors are hard failures.

use pulse_core::TestStatus;

use crate::client::ProbeResponse;
use crate::error::ProbeError;

/// Characters of error text kept in the message of an unclassified failure.
const MAX_ERROR_CHARS: usize = 50;

/// Terminal status plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: TestStatus,
    pub message: String,
    pub elapsed_ms: u64,
}

impl Classification {
    fn success(message: String, elapsed_ms: u64) -> Self {
        Self {
            status: TestStatus::Success,
            message,
            elapsed_ms,
        }
    }

    fn error(message: String, elapsed_ms: u64) -> Self {
        Self {
            status: TestStatus::Error,
            message,
            elapsed_ms,
        }
    }
}

/// Classify the outcome of one probe request.
///
/// Returns `None` for a cancelled request, which has no outcome to report.
pub fn classify(
    outcome: &Result<ProbeResponse, ProbeError>,
    requires_auth: bool,
) -> Option<Classification> {
    match outcome {
        Ok(response) => Some(Classification::success(
            format!("OK ({}ms)", response.elapsed_ms),
            response.elapsed_ms,
        )),
        Err(ProbeError::Status {
            status,
            message,
            elapsed_ms,
        }) => Some(classify_status(*status, message, requires_auth, *elapsed_ms)),
        Err(ProbeError::Transport {
            message,
            elapsed_ms,
        }) => Some(unclassified(message, *elapsed_ms)),
        Err(ProbeError::Cancelled) => None,
    }
}

/// Map an HTTP error status to a terminal outcome.
pub fn classify_status(
    status: u16,
    message: &str,
    requires_auth: bool,
    elapsed_ms: u64,
) -> Classification {
    let ms = elapsed_ms;
    match status {
        401 | 403 if requires_auth => Classification::error(format!("Auth required ({ms}ms)"), ms),
        401 | 403 => Classification::success(format!("Auth protected ({ms}ms)"), ms),
        404 => Classification::success(format!("Endpoint exists ({ms}ms)"), ms),
        405 => Classification::error(format!("Method not allowed ({ms}ms)"), ms),
        400 | 422 if message.to_ascii_lowercase().contains("required") => Classification::success(
            format!("Endpoint exists - missing required field ({ms}ms)"),
            ms,
        ),
        400 | 422 => Classification::success(
            format!("Endpoint exists - validation error ({ms}ms)"),
            ms,
        ),
        500 => Classification::success(format!("Endpoint exists - server error ({ms}ms)"), ms),
        503 => Classification::success(
            format!("Endpoint exists - service unavailable ({ms}ms)"),
            ms,
        ),
        _ => unclassified(&format!("HTTP {status}: {message}"), ms),
    }
}

fn unclassified(text: &str, elapsed_ms: u64) -> Classification {
    let truncated: String = text.chars().take(MAX_ERROR_CHARS).collect();
    Classification::error(format!("{truncated} ({elapsed_ms}ms)"), elapsed_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_err(status: u16, message: &str, elapsed_ms: u64) -> Result<ProbeResponse, ProbeError> {
        Err(ProbeError::status(status, message, elapsed_ms))
    }

    fn ok(elapsed_ms: u64) -> Result<ProbeResponse, ProbeError> {
        Ok(ProbeResponse {
            status: 200,
            body: String::new(),
            elapsed_ms,
        })
    }

    #[test]
    fn success_reports_elapsed() {
        let c = classify(&ok(5), false).unwrap();
        assert_eq!(c.status, TestStatus::Success);
        assert_eq!(c.message, "OK (5ms)");
        assert_eq!(c.elapsed_ms, 5);
    }

    #[test]
    fn not_found_proves_route_exists() {
        for requires_auth in [false, true] {
            let c = classify(&status_err(404, "Not Found", 12), requires_auth).unwrap();
            assert_eq!(c.status, TestStatus::Success);
            assert_eq!(c.message, "Endpoint exists (12ms)");
        }
    }

    #[test]
    fn auth_rejection_passes_when_auth_not_expected() {
        for status in [401, 403] {
            let c = classify(&status_err(status, "Unauthorized", 3), false).unwrap();
            assert_eq!(c.status, TestStatus::Success);
            assert_eq!(c.message, "Auth protected (3ms)");
        }
    }

    #[test]
    fn auth_rejection_fails_when_auth_expected() {
        for status in [401, 403] {
            let c = classify(&status_err(status, "Unauthorized", 3), true).unwrap();
            assert_eq!(c.status, TestStatus::Error);
            assert_eq!(c.message, "Auth required (3ms)");
        }
    }

    #[test]
    fn method_not_allowed_fails() {
        let c = classify(&status_err(405, "Method Not Allowed", 7), false).unwrap();
        assert_eq!(c.status, TestStatus::Error);
        assert_eq!(c.message, "Method not allowed (7ms)");
    }

    #[test]
    fn validation_errors_pass_with_distinct_messages() {
        let missing = classify(&status_err(422, "Field 'email' is Required", 9), false).unwrap();
        assert_eq!(missing.status, TestStatus::Success);
        assert_eq!(missing.message, "Endpoint exists - missing required field (9ms)");

        let invalid = classify(&status_err(400, "bad email format", 9), false).unwrap();
        assert_eq!(invalid.status, TestStatus::Success);
        assert_eq!(invalid.message, "Endpoint exists - validation error (9ms)");
    }

    #[test]
    fn server_errors_prove_route_exists() {
        let c = classify(&status_err(500, "boom", 40), false).unwrap();
        assert_eq!(c.status, TestStatus::Success);
        assert_eq!(c.message, "Endpoint exists - server error (40ms)");

        let c = classify(&status_err(503, "down", 41), false).unwrap();
        assert_eq!(c.status, TestStatus::Success);
        assert_eq!(c.message, "Endpoint exists - service unavailable (41ms)");
    }

    #[test]
    fn unknown_status_fails_with_truncated_text() {
        let long = "x".repeat(200);
        let c = classify(&status_err(418, &long, 2), false).unwrap();
        assert_eq!(c.status, TestStatus::Error);

        let expected: String = format!("HTTP 418: {long}").chars().take(50).collect();
        assert_eq!(c.message, format!("{expected} (2ms)"));
    }

    #[test]
    fn transport_failure_is_error() {
        let outcome = Err(ProbeError::transport("connection refused", 1));
        let c = classify(&outcome, false).unwrap();
        assert_eq!(c.status, TestStatus::Error);
        assert_eq!(c.message, "connection refused (1ms)");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(60);
        let outcome = Err(ProbeError::transport(text, 0));
        let c = classify(&outcome, false).unwrap();
        assert_eq!(c.message, format!("{} (0ms)", "é".repeat(50)));
    }

    #[test]
    fn cancelled_has_no_classification() {
        assert_eq!(classify(&Err(ProbeError::Cancelled), false), None);
    }
}
