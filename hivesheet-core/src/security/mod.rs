//! Credential handling for Hive connections.
//!
//! - `credentials`: username/password container with automatic memory zeroing
//! - `secrets`: loader for the local JSON secrets file
//!
//! Credentials are never logged, serialized or included in error messages.

mod credentials;
pub mod secrets;

pub use credentials::Credentials;
pub use secrets::{DEFAULT_SECRETS_PATH, load_secrets};
