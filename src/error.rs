//! Application error taxonomy for the batch loader.

use thiserror::Error;

/// Broad classification of an [`AppError`], independent of the specific
/// variant payload. Mirrors the kinds surfaced in `LoadProgress.error.kind`
/// and `LoadResult.errors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Reference,
    Staging,
    Execution,
    Transaction,
    Connection,
    Timeout,
    Cancelled,
    Configuration,
    Internal,
}

/// Application-level errors for the batch loader.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("reference warning: {0}")]
    Reference(String),

    #[error("staging error: {0}")]
    Staging(String),

    #[error("execution error: {message}")]
    Execution { message: String, query: String },

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("operation cancelled: {0}")]
    Cancelled(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Maps this error onto the coarse taxonomy used by progress/result reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Reference(_) => ErrorKind::Reference,
            AppError::Staging(_) => ErrorKind::Staging,
            AppError::Execution { .. } => ErrorKind::Execution,
            AppError::Transaction(_) => ErrorKind::Transaction,
            AppError::Connection(_) => ErrorKind::Connection,
            AppError::Timeout(_) => ErrorKind::Timeout,
            AppError::Cancelled(_) => ErrorKind::Cancelled,
            AppError::Configuration(_) => ErrorKind::Configuration,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error is recoverable in the sense used by `LoadProgress.error.recoverable`:
    /// the load as a whole may still succeed (a reference warning) rather than abort.
    pub fn recoverable(&self) -> bool {
        matches!(self, AppError::Reference(_))
    }
}

impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        let detail = err
            .as_db_error()
            .map(|db_err| {
                format!(
                    "{}: {} ({})",
                    db_err.severity(),
                    db_err.message(),
                    db_err.code().code()
                )
            })
            .unwrap_or_else(|| err.to_string());
        AppError::Execution {
            message: detail,
            query: String::new(),
        }
    }
}

impl From<deadpool_postgres::PoolError> for AppError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        AppError::Connection(err.to_string())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}
