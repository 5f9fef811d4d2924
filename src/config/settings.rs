//! Environment-based settings.

use std::env;

use thiserror::Error;

/// Upstream `authentication` header value.
pub const DEV_KEY_VAR: &str = "AF_DEV_KEY";
/// Inbound `authentication` header value clients must present.
pub const AUTH_KEY_VAR: &str = "PROXY_AUTH_KEY";
/// TCP port to listen on.
pub const LISTEN_PORT_VAR: &str = "AF_PROXY_PORT";
/// Override for the upstream base endpoint (tests, staging).
pub const ENDPOINT_VAR: &str = "AF_ENDPOINT";
/// Override for the route prefix segment.
pub const ROUTE_PREFIX_VAR: &str = "AF_PROXY_PREFIX";
/// StatsD collector `host:port`; metrics are disabled when unset.
pub const STATSD_ADDR_VAR: &str = "STATSD_ADDR";
/// Metric namespace prepended to every record.
pub const STATSD_PREFIX_VAR: &str = "STATSD_PREFIX";

const DEFAULT_ENDPOINT: &str = "https://api2.appsflyer.com/inappevent";
const DEFAULT_ROUTE_PREFIX: &str = "appsflyer_proxy";
const DEFAULT_STATSD_PREFIX: &str = "appsflyer_proxy";
const DEFAULT_STATSD_BUFFER: usize = 1024;

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    /// The listen port is not a positive integer.
    #[error("{0} must be an integer between 1 and 65535, got '{1}'")]
    InvalidPort(&'static str, String),
}

/// Validated process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Key clients must present in the `authentication` header.
    pub auth_key: String,
    /// Key sent to the upstream in the `authentication` header.
    pub dev_key: String,
    /// Listen port.
    pub port: u16,
    /// Upstream base endpoint, without a trailing slash.
    pub endpoint: String,
    /// Fixed first path segment of the proxied route.
    pub route_prefix: String,
    /// StatsD emitter settings, if metrics are enabled.
    pub statsd: Option<StatsdSettings>,
}

/// StatsD emitter settings.
#[derive(Debug, Clone)]
pub struct StatsdSettings {
    /// Collector address, `host:port`.
    pub address: String,
    /// Metric namespace (`<project>.<metric>:...`).
    pub project: String,
    /// Bounded queue capacity; producers wait when it is full.
    pub buffer: usize,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let auth_key = require(&lookup, AUTH_KEY_VAR)?;
        let dev_key = require(&lookup, DEV_KEY_VAR)?;

        let port_raw = require(&lookup, LISTEN_PORT_VAR)?;
        let port = match port_raw.parse::<u16>() {
            Ok(p) if p > 0 => p,
            _ => return Err(ConfigError::InvalidPort(LISTEN_PORT_VAR, port_raw)),
        };

        let endpoint = lookup(ENDPOINT_VAR)
            .filter(|v| !v.is_empty())
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let route_prefix = lookup(ROUTE_PREFIX_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ROUTE_PREFIX.to_string());

        let statsd = lookup(STATSD_ADDR_VAR)
            .filter(|v| !v.is_empty())
            .map(|address| StatsdSettings {
                address,
                project: lookup(STATSD_PREFIX_VAR)
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_STATSD_PREFIX.to_string()),
                buffer: DEFAULT_STATSD_BUFFER,
            });

        Ok(Self {
            auth_key,
            dev_key,
            port,
            endpoint,
            route_prefix,
            statsd,
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map = vars(pairs);
        Settings::from_vars(|name| map.get(name).cloned())
    }

    #[test]
    fn loads_required_settings() {
        let settings = load(&[
            (AUTH_KEY_VAR, "inbound-secret"),
            (DEV_KEY_VAR, "dev-secret"),
            (LISTEN_PORT_VAR, "8080"),
        ])
        .unwrap();

        assert_eq!(settings.auth_key, "inbound-secret");
        assert_eq!(settings.dev_key, "dev-secret");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.endpoint, "https://api2.appsflyer.com/inappevent");
        assert_eq!(settings.route_prefix, "appsflyer_proxy");
        assert!(settings.statsd.is_none());
    }

    #[test]
    fn missing_dev_key_is_fatal() {
        let err = load(&[(AUTH_KEY_VAR, "a"), (LISTEN_PORT_VAR, "8080")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(DEV_KEY_VAR)));
    }

    #[test]
    fn empty_auth_key_is_fatal() {
        let err = load(&[
            (AUTH_KEY_VAR, ""),
            (DEV_KEY_VAR, "d"),
            (LISTEN_PORT_VAR, "8080"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(AUTH_KEY_VAR)));
    }

    #[test]
    fn rejects_non_integer_and_zero_port() {
        for bad in ["abc", "0", "-1", "70000"] {
            let err = load(&[
                (AUTH_KEY_VAR, "a"),
                (DEV_KEY_VAR, "d"),
                (LISTEN_PORT_VAR, bad),
            ])
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPort(..)), "port '{bad}'");
        }
    }

    #[test]
    fn endpoint_override_strips_trailing_slash() {
        let settings = load(&[
            (AUTH_KEY_VAR, "a"),
            (DEV_KEY_VAR, "d"),
            (LISTEN_PORT_VAR, "8080"),
            (ENDPOINT_VAR, "http://127.0.0.1:9000/inappevent/"),
        ])
        .unwrap();
        assert_eq!(settings.endpoint, "http://127.0.0.1:9000/inappevent");
    }

    #[test]
    fn statsd_enabled_when_address_set() {
        let settings = load(&[
            (AUTH_KEY_VAR, "a"),
            (DEV_KEY_VAR, "d"),
            (LISTEN_PORT_VAR, "8080"),
            (STATSD_ADDR_VAR, "127.0.0.1:8125"),
            (STATSD_PREFIX_VAR, "events"),
        ])
        .unwrap();

        let statsd = settings.statsd.unwrap();
        assert_eq!(statsd.address, "127.0.0.1:8125");
        assert_eq!(statsd.project, "events");
        assert!(statsd.buffer > 0);
    }
}
