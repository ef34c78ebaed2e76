use thiserror::Error;

/// Client-wide error types.
///
/// Every failure is scoped to the single interaction that triggered it;
/// nothing here is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextbinError {
    /// Rejected on the client before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Wrong or missing credentials on a gated read.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other transport or server failure.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Local bookmark persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TextbinError {
    /// Collapse a backend failure into `RequestFailed`.
    ///
    /// Lifecycle operations report every backend failure uniformly; local
    /// validation errors pass through untouched.
    pub fn into_request_failed(self) -> Self {
        match self {
            TextbinError::AccessDenied(msg) => TextbinError::RequestFailed(msg),
            other => other,
        }
    }

    /// Returns `true` for errors raised before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, TextbinError::Validation(_))
    }
}

impl From<reqwest::Error> for TextbinError {
    fn from(err: reqwest::Error) -> Self {
        TextbinError::RequestFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_collapses_to_request_failed() {
        let err = TextbinError::AccessDenied("Invalid update code".into()).into_request_failed();
        assert_eq!(err, TextbinError::RequestFailed("Invalid update code".into()));
    }

    #[test]
    fn test_validation_survives_collapse() {
        let err = TextbinError::Validation("Title is required".into()).into_request_failed();
        assert!(err.is_validation());
    }

    #[test]
    fn test_display() {
        let err = TextbinError::AccessDenied("Wrong password".into());
        assert_eq!(err.to_string(), "Access denied: Wrong password");
    }
}
