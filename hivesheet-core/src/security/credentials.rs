//! Secure credential container with automatic memory zeroing.

use zeroize::{Zeroize, Zeroizing};

/// Username and password for the Hive server's custom authentication.
///
/// Both values live in `Zeroizing` containers and are cleared on drop.
/// The `Debug` output never shows the password.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hivesheet_core::security::Credentials;
    ///
    /// let creds = Credentials::new("analyst".to_string(), "secret".to_string());
    /// assert_eq!(creds.username(), "analyst");
    /// assert!(!format!("{creds:?}").contains("secret"));
    /// ```
    pub fn new(username: String, password: String) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Exposes the password for handing to the driver. Never log the result.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// True when both username and password are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"****")
            .field("password", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser".to_string(), "testpass".to_string());
        assert_eq!(creds.username(), "testuser");
        assert_eq!(creds.password(), "testpass");
        assert!(creds.is_complete());
    }

    #[test]
    fn test_credentials_incomplete() {
        let creds = Credentials::new("testuser".to_string(), String::new());
        assert!(!creds.is_complete());
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::new("admin_user".to_string(), "super_secret".to_string());
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super_secret"));
        assert!(!debug.contains("admin_user"));
    }
}
