//! Error types for the wellbeing companion Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum accepted length of the student's text, in characters, after normalization.
pub const MAX_INPUT_CHARS: usize = 2000;

/// Errors that can reach the caller as a non-200 response.
///
/// Content-recovery problems (unparseable model output, safety blocks) are not
/// represented here; they resolve to a [`crate::StructuredReply`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Text missing, or empty once whitespace is collapsed
    #[error("Text is required")]
    EmptyInput,

    /// Text longer than [`MAX_INPUT_CHARS`] after normalization
    #[error("Text must be at most 2000 characters (got {chars})")]
    InputTooLarge { chars: usize },

    /// Missing or unusable server configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The completion service did not answer before the deadline
    #[error("Completion service timed out")]
    UpstreamTimeout,

    /// DNS, connect, reset or any other transport failure short of a timeout
    #[error("Completion service unreachable: {0}")]
    UpstreamTransport(String),

    /// The completion service answered with a non-2xx status
    #[error("Completion service returned {status}: {message}")]
    UpstreamRejection { status: u16, message: String },

    /// The completion service answered 2xx but without an interpretable payload
    #[error("Unexpected completion service response: {0}")]
    UpstreamShape(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::EmptyInput => 400,
            Error::InputTooLarge { .. } => 413,
            Error::UpstreamShape(_) => 502,
            Error::UpstreamTimeout | Error::UpstreamTransport(_) => 504,
            Error::UpstreamRejection { status, .. } if (400..600).contains(status) => *status,
            Error::UpstreamRejection { .. } => 502,
            _ => 500,
        }
    }

    /// Message placed in the `{ "error": ... }` envelope.
    ///
    /// Upstream rejection detail is only exposed in development; infrastructure
    /// detail never is.
    pub fn public_message(&self, development: bool) -> String {
        match self {
            Error::EmptyInput | Error::InputTooLarge { .. } => self.to_string(),
            Error::UpstreamTimeout => "The request took too long. Please try again.".to_string(),
            Error::UpstreamTransport(_) => {
                "The wellbeing service could not be reached. Please try again.".to_string()
            }
            Error::UpstreamRejection { .. } | Error::UpstreamShape(_) if development => {
                self.to_string()
            }
            Error::UpstreamRejection { .. } => {
                "The wellbeing service is unavailable right now.".to_string()
            }
            Error::UpstreamShape(_) => {
                "The wellbeing service returned an unexpected response.".to_string()
            }
            Error::Config(_) if development => self.to_string(),
            Error::Config(_) => "Server is not configured".to_string(),
            Error::Aws(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::EmptyInput.status_code(), 400);
        assert_eq!(Error::InputTooLarge { chars: 2001 }.status_code(), 413);
        assert_eq!(Error::Config("missing key".into()).status_code(), 500);
        assert_eq!(Error::UpstreamShape("no text".into()).status_code(), 502);
        assert_eq!(Error::UpstreamTimeout.status_code(), 504);
        assert_eq!(Error::UpstreamTransport("reset".into()).status_code(), 504);
        assert_eq!(Error::Aws("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_upstream_status_passes_through() {
        let err = Error::UpstreamRejection {
            status: 429,
            message: "quota".into(),
        };
        assert_eq!(err.status_code(), 429);

        let err = Error::UpstreamRejection {
            status: 302,
            message: "moved".into(),
        };
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_rejection_detail_hidden_in_production() {
        let err = Error::UpstreamRejection {
            status: 403,
            message: "API key not valid".into(),
        };
        assert!(!err.public_message(false).contains("API key"));
        assert!(err.public_message(true).contains("API key not valid"));
    }

    #[test]
    fn test_internal_detail_never_exposed() {
        let err = Error::Aws("secret arn:aws:...".into());
        assert_eq!(err.public_message(true), "Internal server error");
    }
}
