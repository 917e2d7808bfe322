//! HTTP server settings and the assembled server configuration.

use std::net::{Ipv4Addr, SocketAddr};

use chrono::Duration;
use ortho_config::OrthoConfig;
use rideshare::domain::TokenSettings;
use rideshare::outbound::persistence::{DbPool, PoolConfig};
use serde::Deserialize;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

/// Values read from `RIDESHARE_*` environment variables, config files and
/// command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RIDESHARE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Lifetime of issued credentials in seconds.
    pub token_ttl_seconds: Option<i64>,
}

impl ServerSettings {
    /// Configured bind address, defaulting to `0.0.0.0:8080`.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Pool configuration when a database URL is set.
    #[must_use]
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            PoolConfig::new(url).with_max_size(
                self.db_max_connections
                    .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            )
        })
    }

    /// Credential lifetime, defaulting to one hour.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.token_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECONDS))
    }
}

/// Everything [`super::create_server`] needs to assemble the application.
pub struct ServerConfig {
    pub(crate) token_settings: TokenSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a configuration that serves from in-memory stores.
    #[must_use]
    pub fn new(token_settings: TokenSettings, bind_addr: SocketAddr) -> Self {
        Self {
            token_settings,
            bind_addr,
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database pool so the Diesel repositories are used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "RIDESHARE_BIND_ADDR",
        "RIDESHARE_DATABASE_URL",
        "RIDESHARE_DB_MAX_CONNECTIONS",
        "RIDESHARE_TOKEN_TTL_SECONDS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("rideshare")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert!(settings.pool_config().is_none());
        assert_eq!(settings.token_ttl(), Duration::hours(1));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("RIDESHARE_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "RIDESHARE_DATABASE_URL",
                Some("postgres://rides@localhost/rides".to_owned()),
            ),
            ("RIDESHARE_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("RIDESHARE_TOKEN_TTL_SECONDS", Some("900".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        let pool = settings.pool_config().expect("pool config");
        assert_eq!(pool.database_url(), "postgres://rides@localhost/rides");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(settings.token_ttl(), Duration::minutes(15));
    }
}
