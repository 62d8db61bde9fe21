//! Loader for the local JSON secrets file.
//!
//! The file holds a `hive` object with `host`, optional `port`, `username`
//! and `password` (plus an optional ODBC `driver` name):
//!
//! ```json
//! { "hive": { "host": "hive.internal", "port": 10000, "username": "u", "password": "p" } }
//! ```

use serde_json::Value;
use std::path::Path;
use tracing::{debug, error};

/// Secrets file location used when none is configured.
pub const DEFAULT_SECRETS_PATH: &str = "../secrets/secrets.json";

/// Reads and parses the secrets file.
///
/// Returns `None` on any I/O or parse failure after logging it; callers
/// decide whether a missing file is fatal.
pub fn load_secrets(path: impl AsRef<Path>) -> Option<Value> {
    let path = path.as_ref();
    debug!("Loading secrets from {}", path.display());

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            error!("Failed to read secrets file {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<Value>(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            // serde_json errors report line/column only, never the content
            error!("Failed to parse secrets file {}: {}", path.display(), e);
            None
        }
    }
}
