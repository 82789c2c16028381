/// Centralized error types for the synthetic data generator
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthError {
    // Input Errors
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // Time Errors
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Ambiguous local time: {0}")]
    AmbiguousLocalTime(String),

    #[error("Nonexistent local time: {0}")]
    NonexistentLocalTime(String),

    // Calendar Errors
    #[error("Unknown calendar: {0}")]
    UnknownCalendar(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parse failed: {0}")]
    TomlError(String),

    // File I/O Errors
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SynthError>;

impl SynthError {
    /// Check if error must abort the call that raised it
    pub fn is_fatal(&self) -> bool {
        matches!(self, SynthError::EmptyInput(_))
    }

    /// Check if error came from loading or validating configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SynthError::ConfigError(_)
                | SynthError::TomlError(_)
                | SynthError::UnknownCalendar(_)
                | SynthError::UnknownTimeZone(_)
                | SynthError::InvalidSession(_)
        )
    }

    /// Get error code for logging/monitoring
    pub fn error_code(&self) -> &str {
        match self {
            SynthError::EmptyInput(_) => "INPUT_001",
            SynthError::InvalidParameter(_) => "INPUT_002",
            SynthError::UnknownTimeZone(_) => "TZ_001",
            SynthError::InvalidTimestamp(_) => "TZ_002",
            SynthError::AmbiguousLocalTime(_) => "TZ_003",
            SynthError::NonexistentLocalTime(_) => "TZ_004",
            SynthError::UnknownCalendar(_) => "CAL_001",
            SynthError::InvalidSession(_) => "CAL_002",
            SynthError::ConfigError(_) => "CFG_001",
            SynthError::TomlError(_) => "CFG_002",
            SynthError::FileError(_) => "FILE_001",
            SynthError::CsvError(_) => "FILE_002",
            SynthError::SerializationError(_) => "FILE_003",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_fatal() {
        let err = SynthError::EmptyInput("no requests".to_string());
        assert!(err.is_fatal());
        assert_eq!(err.error_code(), "INPUT_001");
        assert_eq!(err.to_string(), "Empty input: no requests");
    }

    #[test]
    fn test_config_errors_classified() {
        assert!(SynthError::UnknownCalendar("lse".to_string()).is_config_error());
        assert!(!SynthError::EmptyInput(String::new()).is_config_error());
    }
}
