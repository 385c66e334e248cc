use thiserror::Error;

/// Top-level error type for the TwinTone system.
///
/// The first three variants are the caller-visible failure kinds of the
/// generate/history pipeline; the rest cover startup and plumbing. Subsystem
/// crates define their own error types and implement
/// `From<SubsystemError> for TwinToneError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TwinToneError {
    /// Bad input. Never retried; surfaced as a client error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The generation backend failed after retries, or the request timed out.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Storage failed to read or write conversation records.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TwinToneError {
    fn from(err: toml::de::Error) -> Self {
        TwinToneError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TwinToneError {
    fn from(err: toml::ser::Error) -> Self {
        TwinToneError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TwinToneError {
    fn from(err: serde_json::Error) -> Self {
        TwinToneError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for TwinTone operations.
pub type Result<T> = std::result::Result<T, TwinToneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TwinToneError::Validation("query must not be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: query must not be empty");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(TwinToneError, &str)> = vec![
            (
                TwinToneError::Generation("backend down".to_string()),
                "Generation error: backend down",
            ),
            (
                TwinToneError::Persistence("disk full".to_string()),
                "Persistence error: disk full",
            ),
            (
                TwinToneError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                TwinToneError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
            (
                TwinToneError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TwinToneError = io_err.into();
        assert!(matches!(err, TwinToneError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: TwinToneError = err.unwrap_err().into();
        assert!(matches!(err, TwinToneError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: TwinToneError = err.unwrap_err().into();
        assert!(matches!(err, TwinToneError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
