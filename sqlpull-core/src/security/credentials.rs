//! Basic-auth credential container with automatic memory zeroing.
//!
//! # Security
//! - Username and password live in `Zeroizing<String>` containers
//! - Memory is cleared when the credentials go out of scope
//! - `Debug` output never includes the password

use serde::Deserialize;
use zeroize::{Zeroize, Zeroizing};

/// Username/password pair used for basic authentication.
///
/// Deserializes from the platform's `{"userName": ..., "password": ...}`
/// shape.
///
/// # Example
///
/// ```rust
/// use sqlpull_core::security::Credentials;
///
/// let creds = Credentials::new("admin".to_string(), "secret".to_string());
/// assert_eq!(creds.username(), "admin");
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize, Deserialize)]
#[zeroize(drop)]
pub struct Credentials {
    #[serde(rename = "userName")]
    username: Zeroizing<String>,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: String, password: String) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password for handing to the driver. Never log this.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_str())
            .field("password", &"****")
            .finish()
    }
}
