use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Schema compilation failed: {message}")]
    SchemaCompileError { message: String },

    #[error("Concurrent task failed: {details}")]
    ConcurrencyError { details: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Io,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::SerializationError(_) => ErrorCategory::Data,
            EtlError::SchemaCompileError { .. } | EtlError::ConcurrencyError { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                ErrorSeverity::Medium
            }
            EtlError::IoError(_)
            | EtlError::SerializationError(_)
            | EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            EtlError::SchemaCompileError { .. } | EtlError::ConcurrencyError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::IoError(e) => match e.kind() {
                std::io::ErrorKind::NotFound => {
                    "Check that the input directory exists and the path is spelled correctly"
                        .to_string()
                }
                std::io::ErrorKind::PermissionDenied => {
                    "Check read permission on the input directory and write permission on the output directory".to_string()
                }
                _ => "Check the file system paths and available disk space".to_string(),
            },
            EtlError::SerializationError(_) => {
                "Check that the report path points to a writable location".to_string()
            }
            EtlError::ConfigError { .. } | EtlError::ConfigValidationError { .. } => {
                "Review the configuration file syntax and values".to_string()
            }
            EtlError::MissingConfigError { field } => {
                format!("Add the '{}' setting to the configuration", field)
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            EtlError::SchemaCompileError { .. } => {
                "The embedded lottery schema is broken; rebuild from a clean checkout".to_string()
            }
            EtlError::ConcurrencyError { .. } => {
                "Retry with a lower --concurrent-files value".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Io => format!("Could not access files: {}", self),
            ErrorCategory::Data => format!("Could not process data: {}", self),
            ErrorCategory::System => format!("Internal error: {}", self),
        }
    }

    /// Process exit code used by the binaries for a failed run.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
