//! Credential handling.
//!
//! Credentials are stored in `Zeroizing` containers and are redacted from
//! debug output. The connection URL built by this crate never embeds them.

mod credentials;

pub use credentials::Credentials;
