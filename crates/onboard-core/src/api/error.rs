//! Failures talking to the survey platform.
//!
//! Every form lives in its own survey asset, so the asset uid travels with
//! the errors an operator can act on (wrong uid, form not shared with the
//! token's account).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    /// The token's account cannot see this asset; the form has to be shared
    /// with it on the platform.
    #[error("Access denied to survey asset {asset}: {body}")]
    AccessDenied { asset: String, body: String },

    /// Missing, mistyped or revoked API token
    #[error("Unauthorized - check the survey platform token")]
    Unauthorized,

    /// Wrong asset uid in the configuration, or the form was deleted
    #[error("Survey asset {asset} not found: {body}")]
    NotFound { asset: String, body: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    /// Platform outage; common when the vessel's uplink is degraded
    #[error("Survey platform error on asset {asset}: {body}")]
    ServerError { asset: String, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Anything that is not a submissions payload, e.g. the HTML login page
    /// a proxy serves instead of JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl SurveyError {
    /// Truncate a response body to avoid logging whole submission payloads
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    }

    /// Map a failed download of `asset` to an error.
    pub fn from_status(status: reqwest::StatusCode, asset: &str, body: &str) -> Self {
        let body = Self::truncate_body(body);
        let asset = asset.to_string();
        match status.as_u16() {
            401 => SurveyError::Unauthorized,
            403 => SurveyError::AccessDenied { asset, body },
            404 => SurveyError::NotFound { asset, body },
            429 => SurveyError::RateLimited,
            500..=599 => SurveyError::ServerError { asset, body },
            _ => SurveyError::InvalidResponse(format!("Asset {} status {}: {}", asset, status, body)),
        }
    }

    /// Transient failures worth another attempt after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SurveyError::RateLimited | SurveyError::ServerError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(matches!(SurveyError::from_status(StatusCode::UNAUTHORIZED, "aIntake", ""), SurveyError::Unauthorized));
        assert!(matches!(
            SurveyError::from_status(StatusCode::NOT_FOUND, "aIntake", "gone"),
            SurveyError::NotFound { asset, body } if asset == "aIntake" && body == "gone"
        ));
        assert!(matches!(SurveyError::from_status(StatusCode::BAD_GATEWAY, "aIntake", ""), SurveyError::ServerError { .. }));
        assert!(matches!(SurveyError::from_status(StatusCode::IM_A_TEAPOT, "aIntake", ""), SurveyError::InvalidResponse(_)));
    }

    #[test]
    fn test_messages_name_the_asset() {
        let err = SurveyError::from_status(StatusCode::FORBIDDEN, "aMedevac", "not shared");
        assert_eq!(err.to_string(), "Access denied to survey asset aMedevac: not shared");
    }

    #[test]
    fn test_is_retryable() {
        assert!(SurveyError::RateLimited.is_retryable());
        assert!(SurveyError::from_status(StatusCode::SERVICE_UNAVAILABLE, "a", "").is_retryable());
        assert!(!SurveyError::Unauthorized.is_retryable());
        assert!(!SurveyError::from_status(StatusCode::NOT_FOUND, "a", "").is_retryable());
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "é".repeat(400);
        match SurveyError::from_status(StatusCode::FORBIDDEN, "aIntake", &body) {
            SurveyError::AccessDenied { body, .. } => {
                assert!(body.ends_with("(truncated, 800 total bytes)"));
                assert!(body.len() < 600);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
