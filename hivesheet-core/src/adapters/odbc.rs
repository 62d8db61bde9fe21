//! ODBC-backed Hive session.
//!
//! Connects through a Hive ODBC driver (Cloudera or Simba) using
//! username/password authentication over a SASL transport, which is what
//! HiveServer2 calls CUSTOM authentication.
//!
//! **Requirements:**
//! - An ODBC driver manager (unixODBC on Linux/macOS)
//! - A Hive ODBC driver registered under the name in `HiveConfig::driver`

use super::{HiveConfig, HiveConnector, HiveSession, Row};
use crate::security::Credentials;
use crate::{HiveSheetError, Result};
use odbc_api::{
    Connection, ConnectionOptions, Cursor, Environment, ResultSetMetadata, buffers::TextRowSet,
};
use tracing::debug;

/// Rows fetched per round trip.
const FETCH_BATCH_SIZE: usize = 1000;

/// Upper bound for a single text value.
const MAX_TEXT_BYTES: usize = 65536;

/// A value longer than `MAX_TEXT_BYTES` fails the query instead of being cut short.
const CHECK_TRUNCATION: bool = true;

/// Connector owning the ODBC environment; sessions borrow from it.
pub struct OdbcConnector {
    env: Environment,
}

impl OdbcConnector {
    /// Creates the ODBC environment.
    ///
    /// # Errors
    /// Returns a connection error if no ODBC driver manager is available.
    pub fn new() -> Result<Self> {
        let env = Environment::new().map_err(|e| {
            HiveSheetError::connection_failed(
                "Failed to create ODBC environment; is an ODBC driver manager installed?",
                e,
            )
        })?;
        Ok(Self { env })
    }
}

/// Wraps an attribute value in braces when it contains ODBC delimiters.
fn odbc_value(value: &str) -> String {
    if value.contains([';', '{', '}', '=']) || value.trim() != value {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

fn connection_string(config: &HiveConfig, credentials: &Credentials) -> String {
    format!(
        "Driver={{{}}};Host={};Port={};AuthMech=3;ThriftTransport=1;UID={};PWD={};",
        config.driver,
        odbc_value(&config.host),
        config.port,
        odbc_value(credentials.username()),
        odbc_value(credentials.password()),
    )
}

impl HiveConnector for OdbcConnector {
    fn connect<'a>(
        &'a self,
        config: &HiveConfig,
        credentials: &Credentials,
    ) -> Result<Box<dyn HiveSession + 'a>> {
        debug!(
            "ODBC connection string (credentials hidden): Driver={{{}}};Host={};Port={};AuthMech=3;...",
            config.driver, config.host, config.port
        );

        let options = ConnectionOptions {
            login_timeout_sec: u32::try_from(config.connect_timeout.as_secs()).ok(),
            ..Default::default()
        };

        let conn = self
            .env
            .connect_with_connection_string(&connection_string(config, credentials), options)
            .map_err(|e| {
                HiveSheetError::connection_failed(
                    format!("Failed to connect to {}:{}", config.host, config.port),
                    e,
                )
            })?;

        Ok(Box::new(OdbcSession { conn }))
    }
}

/// A live ODBC connection to HiveServer2.
pub struct OdbcSession<'env> {
    conn: Connection<'env>,
}

impl HiveSession for OdbcSession<'_> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        debug!("Executing: {}", sql);
        self.conn
            .execute(sql, ())
            .map_err(|e| HiveSheetError::query_failed(sql, e.to_string()))?;
        Ok(())
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        debug!("Querying: {}", sql);
        let fail = |e: odbc_api::Error| HiveSheetError::query_failed(sql, e.to_string());

        let mut rows = Vec::new();
        let Some(mut cursor) = self.conn.execute(sql, ()).map_err(fail)? else {
            return Ok(rows);
        };

        let num_cols = usize::try_from(cursor.num_result_cols().map_err(fail)?).unwrap_or(0);
        let mut buffers =
            TextRowSet::for_cursor(FETCH_BATCH_SIZE, &mut cursor, Some(MAX_TEXT_BYTES))
                .map_err(fail)?;
        let mut row_cursor = cursor.bind_buffer(&mut buffers).map_err(fail)?;

        while let Some(batch) = row_cursor
            .fetch_with_truncation_check(CHECK_TRUNCATION)
            .map_err(|e| {
                HiveSheetError::query_failed(
                    sql,
                    format!("{e} (text values are limited to {MAX_TEXT_BYTES} bytes)"),
                )
            })?
        {
            for row_idx in 0..batch.num_rows() {
                let row = (0..num_cols)
                    .map(|col_idx| {
                        batch
                            .at(col_idx, row_idx)
                            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    })
                    .collect();
                rows.push(row);
            }
        }

        Ok(rows)
    }

    fn close(self: Box<Self>) -> Result<()> {
        // Dropping the connection disconnects it.
        let Self { conn } = *self;
        drop(conn);
        Ok(())
    }
}
