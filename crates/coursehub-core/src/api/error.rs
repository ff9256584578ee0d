use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The session could not be recovered. Tokens have been cleared and the
    /// user must log in again.
    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Login rejected: {0}")]
    InvalidCredentials(String),

    #[error("Request failed with status {}{}", .status, detail_suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload shapes the backend produces: `{"detail": ..}` from raised
/// HTTP errors, `{"message": ..}` from handled failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull a human-readable message out of an error body.
    pub fn decode_detail(body: &str) -> Option<String> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
            if let Some(msg) = parsed.detail.or(parsed.message) {
                return Some(msg);
            }
        }
        Some(Self::truncate_body(trimmed))
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            detail: Self::decode_detail(body),
        }
    }

    /// Decode a non-success response into a typed error.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }

    /// HTTP status for business errors, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Access denied, e.g. a paid lesson the user has not bought.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_detail_field() {
        let detail = ApiError::decode_detail(r#"{"detail": "Course not found"}"#);
        assert_eq!(detail.as_deref(), Some("Course not found"));
    }

    #[test]
    fn test_decode_message_field() {
        let detail = ApiError::decode_detail(r#"{"success": false, "message": "Wrong password"}"#);
        assert_eq!(detail.as_deref(), Some("Wrong password"));
    }

    #[test]
    fn test_decode_plain_body() {
        assert_eq!(
            ApiError::decode_detail("Bad Gateway").as_deref(),
            Some("Bad Gateway")
        );
        assert_eq!(ApiError::decode_detail("   "), None);
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 100);
        let detail = ApiError::decode_detail(&body).unwrap();
        assert!(detail.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(detail.contains("truncated, 600 total bytes"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "课".repeat(MAX_ERROR_BODY_LENGTH);
        let detail = ApiError::truncate_body(&body);
        assert!(detail.contains("truncated"));
    }

    #[test]
    fn test_status_helpers() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, r#"{"detail":"buy it first"}"#);
        assert!(err.is_forbidden());
        assert!(!err.is_not_found());
        assert!(!err.is_session_expired());
        assert_eq!(err.detail(), Some("buy it first"));
        assert_eq!(
            err.to_string(),
            "Request failed with status 403 Forbidden: buy it first"
        );

        let err = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Request failed with status 404 Not Found");

        assert!(ApiError::SessionExpired.is_session_expired());
        assert_eq!(ApiError::SessionExpired.status(), None);
    }
}
