use thiserror::Error;
use std::io;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid {field} parameter: {value}")]
    UnknownOperationVariant { field: String, value: String },

    #[error("Unable to append (Columns do not match): {0}")]
    SchemaMismatch(String),

    #[error("Duplicate columns: {0}")]
    DuplicateColumns(String),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Thread join error: {0}")]
    ThreadJoin(#[from] JoinError),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

// Type alias for Result
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedRequest(msg.into())
    }

    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        Error::MissingField(field.into())
    }

    pub fn unknown_variant<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        Error::UnknownOperationVariant {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn missing_column<S: Into<String>>(name: S) -> Self {
        Error::MissingColumn(name.into())
    }

    pub fn duplicate_columns<S: Into<String>>(msg: S) -> Self {
        Error::DuplicateColumns(msg.into())
    }

    pub fn invalid_table<S: Into<String>>(msg: S) -> Self {
        Error::InvalidTable(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Stable machine-readable name of the error kind, used in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedRequest(_) => "malformed_request",
            Error::MissingField(_) => "missing_field",
            Error::UnknownOperationVariant { .. } => "unknown_operation_variant",
            Error::SchemaMismatch(_) => "schema_mismatch",
            Error::DuplicateColumns(_) => "duplicate_columns",
            Error::MissingColumn(_) => "missing_column",
            Error::InvalidTable(_) => "invalid_table",
            Error::PayloadTooLarge { .. } => "payload_too_large",
            Error::Config(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Csv(_)
            | Error::ThreadJoin(_)
            | Error::ThreadPool(_) => "internal",
        }
    }

    /// HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MalformedRequest(_)
            | Error::MissingField(_)
            | Error::UnknownOperationVariant { .. } => 400,
            Error::SchemaMismatch(_) | Error::DuplicateColumns(_) => 409,
            Error::MissingColumn(_) | Error::InvalidTable(_) => 422,
            Error::PayloadTooLarge { .. } => 413,
            _ => 500,
        }
    }

    /// True when the failure was caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(format!("Thread pool build failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_distinct_per_family() {
        assert_eq!(Error::missing_field("table").status_code(), 400);
        assert_eq!(Error::SchemaMismatch("x".into()).status_code(), 409);
        assert_eq!(Error::missing_column("col").status_code(), 422);
        assert_eq!(Error::config("bad").status_code(), 500);
        assert_eq!(
            Error::PayloadTooLarge { limit: 5 }.status_code(),
            413
        );
    }

    #[test]
    fn test_kind_and_message() {
        let err = Error::unknown_variant("append_type", "diagonal");
        assert_eq!(err.kind(), "unknown_operation_variant");
        assert_eq!(err.to_string(), "Invalid append_type parameter: diagonal");
        assert!(err.is_client_error());
        assert!(!Error::config("x").is_client_error());
    }
}
