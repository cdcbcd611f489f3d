//! Answer service error types

use thiserror::Error;

/// Errors from answer and diagram requests
///
/// The service never retries internally; whether to retry is the caller's
/// decision, surfaced to the user as an explicit action.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// The service returned no usable payload at all
    #[error("the service returned no usable response")]
    NoResponse,

    /// The payload did not conform to the required answer schema
    /// (missing field, wrong type, truncated JSON)
    #[error("malformed answer from the service: {0}")]
    MalformedResponse(String),

    /// The image response contained no inline image part
    #[error("the service returned no image")]
    NoImage,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),
}

impl AnswerError {
    /// Whether a later attempt at the same request could plausibly succeed
    ///
    /// Used only to phrase the message shown next to the retry affordance;
    /// no code path retries automatically.
    pub fn is_transient(&self) -> bool {
        match self {
            AnswerError::Network(_) => true,
            AnswerError::ApiError { status, .. } => *status == 429 || *status >= 500,
            AnswerError::NoResponse | AnswerError::NoImage => true,
            AnswerError::MalformedResponse(_) | AnswerError::Json(_) | AnswerError::MissingApiKey(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transient() {
        assert!(
            AnswerError::ApiError {
                status: 503,
                message: "overloaded".to_string()
            }
            .is_transient()
        );

        assert!(
            !AnswerError::ApiError {
                status: 400,
                message: "bad request".to_string()
            }
            .is_transient()
        );

        assert!(!AnswerError::MalformedResponse("missing field".to_string()).is_transient());
        assert!(AnswerError::NoImage.is_transient());
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = AnswerError::MalformedResponse("missing field `oneLine`".to_string());
        assert!(err.to_string().contains("oneLine"));

        let err = AnswerError::MissingApiKey("GEMINI_API_KEY".to_string());
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
