//! Error types for nutriparse.

use thiserror::Error;

/// Result type alias using [`RepairError`].
pub type Result<T> = std::result::Result<T, RepairError>;

/// The terminal failure of the repair engine.
///
/// Every repair stage signals "not applicable" internally via `Option`;
/// this error is produced only after the whole chain has been exhausted.
#[derive(Debug, Error)]
pub enum RepairError {
    /// No repair stage could recover a JSON value from the input.
    #[error("unable to recover JSON from model output: {message}")]
    Unparsable {
        /// The input, truncated to a loggable length.
        snippet: String,
        /// The last parser error observed before giving up.
        message: String,
    },
}

impl RepairError {
    /// Returns the truncated input that could not be recovered.
    pub fn snippet(&self) -> &str {
        match self {
            RepairError::Unparsable { snippet, .. } => snippet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RepairError::Unparsable {
            snippet: "I cannot analyze this image".to_string(),
            message: "expected value at line 1 column 1".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("unable to recover JSON"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_snippet_accessor() {
        let err = RepairError::Unparsable {
            snippet: "garbage".to_string(),
            message: "oops".to_string(),
        };
        assert_eq!(err.snippet(), "garbage");
    }
}
