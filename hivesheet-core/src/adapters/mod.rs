//! Query engine session traits and scoped session management.
//!
//! The exporter talks to Hive only through [`HiveSession`]; a
//! [`HiveConnector`] opens sessions. [`with_session`] gives the scoped
//! acquisition guarantee: a session that was opened is closed exactly once,
//! whether the body succeeds or fails.
//!
//! # Module Structure
//! - `config`: `HiveConfig` and secrets-file parsing
//! - `identifiers`: identifier quoting and statement construction
//! - `odbc`: ODBC-backed session (feature `odbc`)

use crate::security::Credentials;
use crate::{HiveSheetError, Result};
use tracing::{error, info, warn};

pub mod config;
pub mod identifiers;

#[cfg(feature = "odbc")]
pub mod odbc;

pub use config::{DEFAULT_HIVE_PORT, DEFAULT_ODBC_DRIVER, HiveConfig};

/// One result row; `None` is SQL NULL.
pub type Row = Vec<Option<String>>;

/// An open session against the query engine.
///
/// All statements issued through this trait are read-only
/// (`USE`/`SHOW`/`DESCRIBE`/`SELECT`).
pub trait HiveSession {
    /// Runs a statement that produces no result set.
    ///
    /// # Errors
    /// Returns a query error if the engine rejects the statement.
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Runs a statement and fetches every row of its result set.
    ///
    /// # Errors
    /// Returns a query error if the statement or the fetch fails.
    fn query(&mut self, sql: &str) -> Result<Vec<Row>>;

    /// Closes the session. Consumes it so it cannot be closed twice.
    ///
    /// # Errors
    /// Returns an error if the driver reports a failure while disconnecting.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Opens sessions against a configured server.
pub trait HiveConnector {
    /// Opens a new session using custom (username/password) authentication.
    ///
    /// # Errors
    /// Returns a connection error whose message never contains credentials.
    fn connect<'a>(
        &'a self,
        config: &HiveConfig,
        credentials: &Credentials,
    ) -> Result<Box<dyn HiveSession + 'a>>;
}

/// Runs `body` inside a freshly opened session and always closes it.
///
/// Configuration is validated before any connection attempt. An open
/// failure is logged and returned unchanged. A close failure is logged but
/// never replaces the body's own result.
///
/// # Errors
/// Returns configuration errors, connection errors, or whatever `body` returns.
pub fn with_session<T, F>(
    connector: &dyn HiveConnector,
    config: &HiveConfig,
    credentials: &Credentials,
    body: F,
) -> Result<T>
where
    F: FnOnce(&mut dyn HiveSession) -> Result<T>,
{
    config.validate()?;
    if !credentials.is_complete() {
        return Err(HiveSheetError::configuration(
            "Hive connection settings are incomplete; username and password are required",
        ));
    }

    info!("Connecting to Hive: {}:{}...", config.host, config.port);
    let mut session = connector.connect(config, credentials).map_err(|e| {
        error!("Failed to connect to Hive: {}", e);
        e
    })?;

    let outcome = body(session.as_mut());

    match session.close() {
        Ok(()) => info!("Hive connection closed"),
        Err(e) => warn!("Failed to close Hive connection cleanly: {}", e),
    }

    outcome
}

/// Creates the connector compiled into this build.
///
/// # Errors
/// Returns an unsupported-feature error when no database driver is enabled.
pub fn create_connector() -> Result<Box<dyn HiveConnector>> {
    #[cfg(feature = "odbc")]
    {
        Ok(Box::new(odbc::OdbcConnector::new()?))
    }
    #[cfg(not(feature = "odbc"))]
    {
        Err(HiveSheetError::unsupported_feature(
            "Hive connector",
            "Compile with --features odbc to enable Hive access",
        ))
    }
}
