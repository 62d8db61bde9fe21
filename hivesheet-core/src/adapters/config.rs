//! Hive connection configuration.
//!
//! `HiveConfig` holds everything needed to reach the server except the
//! credentials, which travel separately in a [`Credentials`] value.

use crate::error::HiveSheetError;
use crate::security::Credentials;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// HiveServer2 port used when the secrets file does not name one.
pub const DEFAULT_HIVE_PORT: u16 = 10000;

/// ODBC driver name used when the secrets file does not name one.
pub const DEFAULT_ODBC_DRIVER: &str = "Cloudera ODBC Driver for Apache Hive";

/// Configuration for a Hive session.
///
/// # Security
/// This struct intentionally does NOT store usernames or passwords.
///
/// # Example
/// ```rust
/// use hivesheet_core::adapters::HiveConfig;
///
/// let config = HiveConfig::new("hive.internal".to_string()).with_port(10001);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.to_string(), "HiveConfig(hive.internal:10001)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveConfig {
    /// HiveServer2 host
    pub host: String,
    /// HiveServer2 port
    pub port: u16,
    /// ODBC driver name registered with the driver manager
    pub driver: String,
    /// Login timeout handed to the driver
    pub connect_timeout: Duration,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_HIVE_PORT,
            driver: DEFAULT_ODBC_DRIVER.to_string(),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Display for HiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HiveConfig({}:{})", self.host, self.port)
    }
}

impl HiveConfig {
    /// Creates a new config with defaults for everything but the host.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set the ODBC driver name.
    pub fn with_driver(mut self, driver: String) -> Self {
        self.driver = driver;
        self
    }

    /// Builder method to set the login timeout.
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns a configuration error if any value is unusable.
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(HiveSheetError::configuration("host cannot be empty"));
        }

        if self.port == 0 {
            return Err(HiveSheetError::configuration("port must be greater than 0"));
        }

        if self.driver.trim().is_empty() {
            return Err(HiveSheetError::configuration("driver cannot be empty"));
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(HiveSheetError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Builds a config and credentials from the parsed secrets file.
    ///
    /// `secrets` is `None` when the file could not be loaded.
    ///
    /// # Errors
    /// Returns a configuration error when the secrets are absent, the `hive`
    /// section is missing or empty, or any of host, username and password is
    /// missing or empty.
    ///
    /// # Example
    /// ```rust
    /// use hivesheet_core::adapters::HiveConfig;
    ///
    /// let secrets = serde_json::json!({
    ///     "hive": { "host": "h", "username": "u", "password": "p" }
    /// });
    /// let (config, creds) = HiveConfig::from_secrets(Some(&secrets))?;
    /// assert_eq!(config.port, 10000);
    /// assert_eq!(creds.username(), "u");
    /// # Ok::<(), hivesheet_core::HiveSheetError>(())
    /// ```
    pub fn from_secrets(secrets: Option<&Value>) -> crate::Result<(Self, Credentials)> {
        let secrets = secrets.ok_or_else(|| {
            HiveSheetError::configuration(
                "Unable to load Hive connection settings; check the secrets file",
            )
        })?;

        let hive = secrets
            .get("hive")
            .and_then(Value::as_object)
            .filter(|section| !section.is_empty())
            .ok_or_else(|| {
                HiveSheetError::configuration("Secrets file has no 'hive' connection section")
            })?;

        let field = |key: &str| {
            hive.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToString::to_string)
        };

        let host = field("host");
        let username = field("username");
        let password = hive
            .get("password")
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);

        let missing: Vec<&str> = [
            ("host", host.is_none()),
            ("username", username.is_none()),
            ("password", password.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(host), Some(username), Some(password)) = (host, username, password) else {
            return Err(HiveSheetError::configuration(format!(
                "Hive connection settings are incomplete; missing: {}",
                missing.join(", ")
            )));
        };

        let port = match hive.get("port") {
            None | Some(Value::Null) => DEFAULT_HIVE_PORT,
            Some(value) => parse_port(value)?,
        };

        let mut config = Self::new(host).with_port(port);
        if let Some(driver) = field("driver") {
            config = config.with_driver(driver);
        }
        config.validate()?;

        Ok((config, Credentials::new(username, password)))
    }
}

fn parse_port(value: &Value) -> crate::Result<u16> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };

    parsed.filter(|port| *port > 0).ok_or_else(|| {
        HiveSheetError::configuration(format!("port must be an integer in 1..=65535, got {value}"))
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_hive_config_default() {
        let config = HiveConfig::default();
        assert_eq!(config.port, 10000);
        assert_eq!(config.driver, DEFAULT_ODBC_DRIVER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hive_config_validation() {
        let config = HiveConfig::new(String::new());
        assert!(config.validate().is_err());

        let config = HiveConfig::new("h".to_string()).with_port(0);
        assert!(config.validate().is_err());

        let config = HiveConfig::new("h".to_string()).with_connect_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_secrets_defaults_port() {
        let secrets = json!({"hive": {"host": "h", "username": "u", "password": "p"}});
        let (config, creds) = HiveConfig::from_secrets(Some(&secrets)).unwrap();
        assert_eq!(config.host, "h");
        assert_eq!(config.port, DEFAULT_HIVE_PORT);
        assert_eq!(creds.username(), "u");
        assert_eq!(creds.password(), "p");
    }

    #[test]
    fn test_from_secrets_explicit_port_and_driver() {
        let secrets = json!({"hive": {
            "host": "h", "port": "10001", "username": "u", "password": "p",
            "driver": "Simba Hive ODBC Driver"
        }});
        let (config, _) = HiveConfig::from_secrets(Some(&secrets)).unwrap();
        assert_eq!(config.port, 10001);
        assert_eq!(config.driver, "Simba Hive ODBC Driver");
    }

    #[test]
    fn test_from_secrets_missing_file() {
        let err = HiveConfig::from_secrets(None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_secrets_missing_section() {
        let err = HiveConfig::from_secrets(Some(&json!({"other": {}}))).unwrap_err();
        assert!(err.is_configuration());

        let err = HiveConfig::from_secrets(Some(&json!({"hive": {}}))).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_secrets_incomplete_lists_fields() {
        let secrets = json!({"hive": {"host": "h", "username": ""}});
        let err = HiveConfig::from_secrets(Some(&secrets)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("username"));
        assert!(message.contains("password"));
        assert!(!message.contains("host,"));
    }

    #[test]
    fn test_from_secrets_bad_port() {
        let secrets = json!({"hive": {"host": "h", "port": 70000, "username": "u", "password": "p"}});
        assert!(HiveConfig::from_secrets(Some(&secrets)).is_err());
    }

    #[test]
    fn test_display_omits_credentials() {
        let secrets = json!({"hive": {"host": "h", "username": "admin_user", "password": "pw123"}});
        let (config, _) = HiveConfig::from_secrets(Some(&secrets)).unwrap();
        let display = format!("{config} {config:?}");
        assert!(!display.contains("admin_user"));
        assert!(!display.contains("pw123"));
    }
}
