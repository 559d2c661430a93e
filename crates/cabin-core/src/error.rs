use thiserror::Error;

/// Top-level error type for the Cabin system.
///
/// Collaborator failures are transport-shaped: a request either cannot be
/// exchanged (`Channel`), takes too long (`Timeout`), or comes back
/// unparseable (`Serialization`). Subsystem crates return `CabinError`
/// directly (or convert into it with `From`) so that the `?` operator works
/// seamlessly across crate boundaries.
///
/// Note that an empty retrieval result set is *not* an error: it is a normal
/// outcome represented by a sentinel answer string in the pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CabinError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Timeout talking to {service} after {ms} ms")]
    Timeout { service: String, ms: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for CabinError {
    fn from(err: toml::de::Error) -> Self {
        CabinError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CabinError {
    fn from(err: toml::ser::Error) -> Self {
        CabinError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CabinError {
    fn from(err: serde_json::Error) -> Self {
        CabinError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Cabin operations.
pub type Result<T> = std::result::Result<T, CabinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CabinError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_timeout_display() {
        let err = CabinError::Timeout {
            service: "retriever".to_string(),
            ms: 5000,
        };
        assert_eq!(err.to_string(), "Timeout talking to retriever after 5000 ms");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cabin_err: CabinError = io_err.into();
        assert!(matches!(cabin_err, CabinError::Io(_)));
        assert!(cabin_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(CabinError, &str)> = vec![
            (
                CabinError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                CabinError::Channel("connection reset".to_string()),
                "Channel error: connection reset",
            ),
            (
                CabinError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let cabin_err: CabinError = err.unwrap_err().into();
        assert!(matches!(cabin_err, CabinError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let cabin_err: CabinError = err.unwrap_err().into();
        assert!(matches!(cabin_err, CabinError::Serialization(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(CabinError::Config("fail".to_string()))
        }

        assert_eq!(returns_ok().unwrap(), 42);
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_timeout_is_distinct_from_channel() {
        // A timed-out call and a transport failure must never be confused.
        let timeout = CabinError::Timeout {
            service: "retriever".to_string(),
            ms: 100,
        };
        assert!(!matches!(timeout, CabinError::Channel(_)));
    }

    #[test]
    fn test_error_debug_impl() {
        let err = CabinError::Timeout {
            service: "generator".to_string(),
            ms: 30000,
        };
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Timeout"));
        assert!(debug_str.contains("generator"));
    }
}
