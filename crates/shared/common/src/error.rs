//! Unified error handling for bootstrap and management commands.
//!
//! Every failure that can abort startup or a management command is
//! represented here, so the binary has a single place to log and exit.

use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration
    #[error("Unknown environment '{name}' (expected one of: {known})")]
    UnknownEnvironment { name: String, known: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    // Log handlers
    #[error("Mail handler error: {0}")]
    MailHandler(String),

    #[error("Syslog handler error: {0}")]
    Syslog(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get a stable error code for logs and exit reporting
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnknownEnvironment { .. } => "UNKNOWN_ENVIRONMENT",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::MailHandler(_) => "MAIL_HANDLER_ERROR",
            AppError::Syslog(_) => "SYSLOG_ERROR",
            AppError::Logging(_) => "LOGGING_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn unknown_environment<I, S>(name: impl Into<String>, known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known = known
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        AppError::UnknownEnvironment {
            name: name.into(),
            known,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn mail_handler(msg: impl Into<String>) -> Self {
        AppError::MailHandler(msg.into())
    }

    pub fn syslog(msg: impl Into<String>) -> Self {
        AppError::Syslog(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_environment_lists_known_names() {
        let err = AppError::unknown_environment("prdo", ["dev", "prod"]);
        assert_eq!(err.code(), "UNKNOWN_ENVIRONMENT");
        assert_eq!(
            err.to_string(),
            "Unknown environment 'prdo' (expected one of: dev, prod)"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.code(), "IO_ERROR");
    }
}
