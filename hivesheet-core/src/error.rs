//! Error types for export and merge runs.
//!
//! Errors never carry credentials. Connection failures describe the target
//! by host and port only, and statement text contains identifiers but never
//! usernames or passwords.

use thiserror::Error;

/// Main error type for hivesheet operations.
#[derive(Debug, Error)]
pub enum HiveSheetError {
    /// Missing or invalid configuration (credentials, options, identifiers)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Opening a session against the query engine failed (credentials sanitized)
    #[error("Hive connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A statement failed on the query engine
    #[error("Query failed: {context} (statement: {statement})")]
    Query { statement: String, context: String },

    /// Table discovery matched nothing
    #[error("No tables matching prefix '{prefix}' in database '{database}'")]
    NoMatchingTables { database: String, prefix: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Writing a workbook or worksheet failed
    #[error("Spreadsheet write failed: {context}")]
    SpreadsheetWrite {
        context: String,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Reading a workbook failed
    #[error("Spreadsheet read failed: {context}")]
    SpreadsheetRead {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Feature not compiled into this build
    #[error("Unsupported operation: {feature} ({hint})")]
    UnsupportedFeature { feature: String, hint: String },
}

/// Convenience type alias for Results with HiveSheetError
pub type Result<T> = std::result::Result<T, HiveSheetError>;

impl HiveSheetError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a connection error with sanitized context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a query error for the given statement
    pub fn query_failed(statement: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Query {
            statement: statement.into(),
            context: context.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a workbook write error with context
    pub fn spreadsheet_write(context: impl Into<String>, source: rust_xlsxwriter::XlsxError) -> Self {
        Self::SpreadsheetWrite {
            context: context.into(),
            source,
        }
    }

    /// Creates a workbook read error with context
    pub fn spreadsheet_read<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SpreadsheetRead {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an unsupported feature error
    pub fn unsupported_feature(feature: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
            hint: hint.into(),
        }
    }

    /// Returns true for errors raised before any connection attempt.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
