//! JDBC-style connection URL construction.
//!
//! Turns a [`ConnectionDescriptor`] into a [`ResolvedConnection`]: host and
//! port pulled out of the descriptor URL plus the full driver URL carrying
//! the SSL, cursor-fetch and TLS protocol parameters. Pure string work, no
//! I/O.

use crate::config::{ConnectionDescriptor, DatabaseType, SslMode};
use crate::error::SqlPullError;
use crate::Result;
use regex::Regex;
use std::sync::OnceLock;

/// Scheme prefix of every URL this module produces.
pub const JDBC_MYSQL_PROTOCOL: &str = "jdbc:mysql://";

/// Port used when the descriptor URL does not name one.
pub const MYSQL_DEFAULT_PORT: u16 = 3306;

/// Query fragment for `verify-full`.
pub const VERIFY_FULL: &str = "useSSL=true&verifyServerCertificate=true";
/// Query fragment for `require`.
pub const REQUIRE: &str = "useSSL=true&requireSSL=true&verifyServerCertificate=false";
/// Query fragment for `prefer`.
pub const PREFER: &str = "useSSL=true&requireSSL=false&verifyServerCertificate=false";

/// Authentication plugin parameter required by the MongoDB BI connector.
pub const MONGODB_AUTH_PLUGIN: &str =
    "authenticationPlugins=org.mongodb.mongosql.auth.plugin.MongoSqlAuthenticationPlugin";

const CURSOR_AND_TLS: &str = "useCursorFetch=true&enabledTLSProtocols=TLSv1.2";

fn jdbc_mysql_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"jdbc:mysql://([^:^/]+)(:([0-9]+))?(/)?").expect("Invalid JDBC MySQL pattern")
    })
}

/// Connection target derived from a descriptor. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database (schema) name
    pub database: String,
    /// Server flavour
    pub database_type: DatabaseType,
    /// Requested TLS policy
    pub ssl_mode: SslMode,
    /// Full driver URL including query parameters
    pub full_url: String,
}

impl std::fmt::Display for ResolvedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_url)
    }
}

/// Returns the SSL query fragment for a mode.
pub const fn ssl_query_fragment(mode: SslMode) -> &'static str {
    match mode {
        SslMode::VerifyFull => VERIFY_FULL,
        SslMode::Require => REQUIRE,
        SslMode::Prefer => PREFER,
    }
}

/// Extracts host and port from a `jdbc:mysql://host[:port][/]` URL.
///
/// # Errors
/// Returns a configuration error if the URL does not match or the port is
/// out of range.
///
/// # Example
/// ```rust
/// use sqlpull_core::connection_url::parse_jdbc_url;
///
/// assert_eq!(parse_jdbc_url("jdbc:mysql://dbhost:3307/").unwrap(), ("dbhost".to_string(), 3307));
/// assert_eq!(parse_jdbc_url("jdbc:mysql://dbhost/").unwrap(), ("dbhost".to_string(), 3306));
/// ```
pub fn parse_jdbc_url(url: &str) -> Result<(String, u16)> {
    let captures = jdbc_mysql_pattern().captures(url).ok_or_else(|| {
        SqlPullError::configuration(format!("Cannot parse connection URL '{}'", url))
    })?;

    let host = captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| SqlPullError::configuration("Connection URL has no host"))?;

    let port = match captures.get(3) {
        Some(port) => port.as_str().parse::<u16>().map_err(|e| {
            SqlPullError::configuration(format!(
                "Invalid port '{}' in connection URL: {}",
                port.as_str(),
                e
            ))
        })?,
        None => MYSQL_DEFAULT_PORT,
    };

    Ok((host, port))
}

/// Builds the driver URL for a descriptor.
///
/// Output shape:
/// `jdbc:mysql://{host}:{port}/{database}?[{mongo-auth}&]{ssl}&useCursorFetch=true&enabledTLSProtocols=TLSv1.2`
///
/// # Errors
/// Returns a configuration error if the descriptor URL cannot be parsed.
pub fn build_url(descriptor: &ConnectionDescriptor) -> Result<ResolvedConnection> {
    let (host, port) = parse_jdbc_url(&descriptor.url)?;
    let database_type = descriptor.database_type();
    let ssl = ssl_query_fragment(descriptor.ssl_mode);

    let full_url = match database_type {
        DatabaseType::MongoDbBi => format!(
            "{}{}:{}/{}?{}&{}&{}",
            JDBC_MYSQL_PROTOCOL,
            host,
            port,
            descriptor.database,
            MONGODB_AUTH_PLUGIN,
            ssl,
            CURSOR_AND_TLS
        ),
        DatabaseType::MySql => format!(
            "{}{}:{}/{}?{}&{}",
            JDBC_MYSQL_PROTOCOL, host, port, descriptor.database, ssl, CURSOR_AND_TLS
        ),
    };

    Ok(ResolvedConnection {
        host,
        port,
        database: descriptor.database.clone(),
        database_type,
        ssl_mode: descriptor.ssl_mode,
        full_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MONGODB_BI_MARKER;
    use crate::security::Credentials;

    fn descriptor(url: &str, ssl_mode: &str) -> ConnectionDescriptor {
        ConnectionDescriptor::new(
            url,
            "sales",
            ssl_mode,
            Credentials::new("etl".to_string(), "secret".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_ssl_fragment_table() {
        let cases = [
            ("verify-full", "useSSL=true&verifyServerCertificate=true"),
            (
                "require",
                "useSSL=true&requireSSL=true&verifyServerCertificate=false",
            ),
            (
                "prefer",
                "useSSL=true&requireSSL=false&verifyServerCertificate=false",
            ),
        ];

        for (mode, expected) in cases {
            let resolved = build_url(&descriptor("jdbc:mysql://dbhost/", mode)).unwrap();
            assert_eq!(
                ssl_query_fragment(mode.parse().unwrap()),
                expected,
                "fragment for {}",
                mode
            );
            assert!(
                resolved.full_url.contains(&format!("?{}&", expected)),
                "url for {}: {}",
                mode,
                resolved.full_url
            );
        }
    }

    #[test]
    fn test_host_and_explicit_port() {
        let resolved = build_url(&descriptor("jdbc:mysql://dbhost:3307/", "prefer")).unwrap();
        assert_eq!(resolved.host, "dbhost");
        assert_eq!(resolved.port, 3307);
    }

    #[test]
    fn test_default_port() {
        let resolved = build_url(&descriptor("jdbc:mysql://dbhost/", "prefer")).unwrap();
        assert_eq!(resolved.host, "dbhost");
        assert_eq!(resolved.port, MYSQL_DEFAULT_PORT);

        let (host, port) = parse_jdbc_url("jdbc:mysql://dbhost").unwrap();
        assert_eq!((host.as_str(), port), ("dbhost", 3306));
    }

    #[test]
    fn test_full_url_assembly() {
        let resolved = build_url(&descriptor("jdbc:mysql://dbhost:3307/ignored", "require")).unwrap();
        assert_eq!(
            resolved.full_url,
            "jdbc:mysql://dbhost:3307/sales?useSSL=true&requireSSL=true&verifyServerCertificate=false&useCursorFetch=true&enabledTLSProtocols=TLSv1.2"
        );
        assert_eq!(resolved.to_string(), resolved.full_url);
    }

    #[test]
    fn test_mongodb_bi_adds_auth_plugin() {
        let mongo = descriptor("jdbc:mysql://bi-host:3307/", "verify-full")
            .with_database_type(MONGODB_BI_MARKER);
        let resolved = build_url(&mongo).unwrap();

        assert_eq!(resolved.database_type, DatabaseType::MongoDbBi);
        assert_eq!(
            resolved.full_url,
            "jdbc:mysql://bi-host:3307/sales?authenticationPlugins=org.mongodb.mongosql.auth.plugin.MongoSqlAuthenticationPlugin&useSSL=true&verifyServerCertificate=true&useCursorFetch=true&enabledTLSProtocols=TLSv1.2"
        );

        let plain = build_url(&descriptor("jdbc:mysql://bi-host:3307/", "verify-full")).unwrap();
        assert!(!plain.full_url.contains("authenticationPlugins"));

        let other = descriptor("jdbc:mysql://bi-host:3307/", "verify-full").with_database_type("MySQL");
        assert!(!build_url(&other).unwrap().full_url.contains("authenticationPlugins"));
    }

    #[test]
    fn test_unparsable_url() {
        for url in ["", "mysql://dbhost/", "jdbc:postgresql://dbhost:5432/", "dbhost:3306"] {
            let err = build_url(&descriptor(url, "prefer")).unwrap_err();
            assert!(err.is_configuration(), "'{}' should not parse", url);
        }
    }

    #[test]
    fn test_port_out_of_range() {
        let err = parse_jdbc_url("jdbc:mysql://dbhost:70000/").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_build_url_is_deterministic() {
        let d = descriptor("jdbc:mysql://dbhost:3307/", "prefer");
        assert_eq!(build_url(&d).unwrap(), build_url(&d).unwrap());
    }
}
