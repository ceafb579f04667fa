use thiserror::Error;

/// Failures surfaced by the GitHub layer.
///
/// `Transport` and `Upstream` are kept apart on purpose: an empty array is
/// "no data", an object with a `message` is GitHub telling us something went
/// wrong, and a dropped connection is neither.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Input rejected before any request was made.
    #[error("invalid repository: {message}")]
    Validation { message: String },

    /// Network failure, timeout, or a body that could not be decoded.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// GitHub answered with an error payload (`{"message": ...}`).
    #[error("GitHub API error: {message}")]
    Upstream { status: u16, message: String },

    /// The token was rejected.
    #[error("authentication failed: {message}")]
    Auth { message: String },
}

impl FetchError {
    pub fn validation(message: impl Into<String>) -> Self {
        FetchError::Validation {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport {
            message: message.into(),
        }
    }

    /// True when GitHub reported the token as invalid or expired
    pub fn is_bad_credentials(&self) -> bool {
        match self {
            FetchError::Auth { .. } => true,
            FetchError::Upstream { status, message } => {
                *status == 401 || message.to_ascii_lowercase().contains("bad credentials")
            }
            _ => false,
        }
    }

    /// Promote a bad-credentials upstream error to `Auth`, leave others alone
    pub fn into_auth_if_bad_credentials(self) -> Self {
        if self.is_bad_credentials() {
            match self {
                FetchError::Upstream { message, .. } => FetchError::Auth { message },
                other => other,
            }
        } else {
            self
        }
    }

    /// The message a presentation layer should show for this failure
    pub fn message(&self) -> &str {
        match self {
            FetchError::Validation { message }
            | FetchError::Transport { message }
            | FetchError::Upstream { message, .. }
            | FetchError::Auth { message } => message,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            "request timed out"
        } else if error.is_connect() {
            "connection failed"
        } else if error.is_decode() {
            "failed to decode response"
        } else {
            "request failed"
        };
        FetchError::transport(format!("{}: {}", kind, error))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::transport(format!("failed to decode response: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_credentials_by_message() {
        let err = FetchError::Upstream {
            status: 403,
            message: "Bad credentials".to_string(),
        };
        assert!(err.is_bad_credentials());
    }

    #[test]
    fn test_bad_credentials_by_status() {
        let err = FetchError::Upstream {
            status: 401,
            message: "Requires authentication".to_string(),
        };
        assert!(err.is_bad_credentials());
    }

    #[test]
    fn test_not_found_is_not_bad_credentials() {
        let err = FetchError::Upstream {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(!err.is_bad_credentials());
        assert_eq!(err.clone().into_auth_if_bad_credentials(), err);
    }

    #[test]
    fn test_transport_is_never_bad_credentials() {
        assert!(!FetchError::transport("Bad credentials").is_bad_credentials());
    }

    #[test]
    fn test_into_auth_keeps_message() {
        let err = FetchError::Upstream {
            status: 401,
            message: "Bad credentials".to_string(),
        }
        .into_auth_if_bad_credentials();
        assert_eq!(
            err,
            FetchError::Auth {
                message: "Bad credentials".to_string()
            }
        );
        assert_eq!(err.message(), "Bad credentials");
    }
}
