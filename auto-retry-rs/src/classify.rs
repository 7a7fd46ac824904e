// auto-retry-rs/src/classify.rs
// Heuristic error classification: decides retryability, assigns a coarse
// category and a static advisory string.

use outcome_log::{ErrorCategory, ErrorClassification};

use crate::error::OperationError;

/// Network error codes considered transient.
pub const RETRYABLE_ERROR_CODES: [&str; 5] = [
    "ETIMEDOUT",
    "ECONNRESET",
    "ENOTFOUND",
    "EAI_AGAIN",
    "ECONNREFUSED",
];

/// HTTP statuses considered transient.
pub const RETRYABLE_HTTP_STATUS: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Classify an operation error.
///
/// Checks run in order: known network code, retryable HTTP status, then a
/// "timeout" substring in the message. The first two set category and fix;
/// the substring check can still upgrade anything else to a retryable
/// timeout. Errors matching none of these stay `unknown` and non-retryable.
pub fn classify(error: &OperationError) -> ErrorClassification {
    let mut classification = ErrorClassification {
        error_type: type_name(error),
        message: error.message().to_string(),
        status_code: error.status(),
        retryable: false,
        category: ErrorCategory::Unknown,
        suggested_fix: "Unknown error".to_string(),
    };

    if let OperationError::Network { code, .. } = error {
        if RETRYABLE_ERROR_CODES.contains(&code.as_str()) {
            classification.retryable = true;
            classification.category = ErrorCategory::Network;
            classification.suggested_fix = suggest_network_fix(code).to_string();
        }
    }

    if let Some(status) = error.status() {
        if RETRYABLE_HTTP_STATUS.contains(&status) {
            classification.retryable = true;
            classification.category = ErrorCategory::Http;
            classification.suggested_fix = suggest_http_fix(status).to_string();
        }
    }

    if matches!(error, OperationError::Timeout { .. }) || error.message().contains("timeout") {
        classification.retryable = true;
        classification.category = ErrorCategory::Timeout;
        classification.suggested_fix = "Increase timeout or check network".to_string();
    }

    classification
}

fn type_name(error: &OperationError) -> String {
    match error {
        OperationError::Network { code, .. } => code.clone(),
        OperationError::Http { status, .. } => format!("HTTP {status}"),
        OperationError::Timeout { .. } => "Timeout".to_string(),
        OperationError::Other { name, .. } => name.clone(),
    }
}

fn suggest_network_fix(code: &str) -> &'static str {
    match code {
        "ETIMEDOUT" => "Network timeout - check connection or increase timeout",
        "ECONNRESET" => "Connection reset - server may be restarting",
        "ENOTFOUND" => "DNS lookup failed - check hostname",
        "EAI_AGAIN" => "DNS temporary failure - retry should work",
        "ECONNREFUSED" => "Connection refused - check if service is running",
        _ => "Network error",
    }
}

fn suggest_http_fix(status: u16) -> &'static str {
    match status {
        408 => "Request timeout - increase timeout",
        429 => "Rate limit exceeded - increase backoff delay",
        500 => "Internal server error - temporary, retry should work",
        502 => "Bad gateway - upstream server issue",
        503 => "Service unavailable - server overloaded",
        504 => "Gateway timeout - upstream server timeout",
        _ => "HTTP error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_network_codes_are_retryable() {
        for code in RETRYABLE_ERROR_CODES {
            let classification = classify(&OperationError::network(code, "boom"));
            assert!(classification.retryable, "{code} should be retryable");
            assert_eq!(classification.category, ErrorCategory::Network);
            assert_eq!(classification.error_type, code);
        }
    }

    #[test]
    fn unknown_network_code_stays_unknown() {
        let classification = classify(&OperationError::network("EPIPE", "broken pipe"));
        assert!(!classification.retryable);
        assert_eq!(classification.category, ErrorCategory::Unknown);
        assert_eq!(classification.suggested_fix, "Unknown error");
    }

    #[test]
    fn retryable_http_statuses_carry_status_code() {
        let classification = classify(&OperationError::http(429, "too many requests"));
        assert!(classification.retryable);
        assert_eq!(classification.category, ErrorCategory::Http);
        assert_eq!(classification.status_code, Some(429));
        assert_eq!(classification.error_type, "HTTP 429");
        assert!(classification.suggested_fix.contains("backoff"));
    }

    #[test]
    fn http_404_is_not_retryable() {
        let classification = classify(&OperationError::http(404, "not found"));
        assert!(!classification.retryable);
        assert_eq!(classification.category, ErrorCategory::Unknown);
    }

    #[test]
    fn timeout_substring_upgrades_any_error() {
        let classification = classify(&OperationError::other("Error", "connect timeout"));
        assert!(classification.retryable);
        assert_eq!(classification.category, ErrorCategory::Timeout);
    }

    #[test]
    fn plain_failures_are_non_retryable() {
        let classification = classify(&OperationError::other("TypeError", "bad input"));
        assert!(!classification.retryable);
        assert_eq!(classification.category, ErrorCategory::Unknown);
        assert_eq!(classification.error_type, "TypeError");
    }
}
