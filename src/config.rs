//! Runtime configuration (§5, §4.8, §4.10): token lifetimes, default
//! session duration, the signing secret, and the revocation hot-tier
//! timeout/cleanup cadence. Grounded on the ambient-config convention the
//! rest of the pack uses for small services — a plain struct populated
//! from environment variables, no config-file crate.

use std::{env, time::Duration};

#[derive(Clone, Debug)]
pub struct Config {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub default_session_duration: Duration,
    pub signing_secret: String,
    /// §5: "no operation may block indefinitely on the hot tier; a
    /// configured short timeout (default 50 ms) with automatic fall-through
    /// to the cold tier applies."
    pub revocation_hot_timeout: Duration,
    pub revocation_cleanup_interval: Duration,
    pub db_pool_min: u32,
    pub db_pool_max: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            default_session_duration: Duration::from_secs(crate::model::Role::DEFAULT_SESSION_DURATION as u64),
            signing_secret: String::new(),
            revocation_hot_timeout: Duration::from_millis(50),
            revocation_cleanup_interval: Duration::from_secs(60),
            db_pool_min: 1,
            db_pool_max: 10,
        }
    }
}

impl Config {
    /// Reads overrides from the environment, falling back to the defaults
    /// above for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            access_token_ttl: env_secs("IAM_ACCESS_TOKEN_TTL_SECS").unwrap_or(defaults.access_token_ttl),
            refresh_token_ttl: env_secs("IAM_REFRESH_TOKEN_TTL_SECS").unwrap_or(defaults.refresh_token_ttl),
            default_session_duration: env_secs("IAM_DEFAULT_SESSION_DURATION_SECS").unwrap_or(defaults.default_session_duration),
            signing_secret: env::var("IAM_SIGNING_SECRET").unwrap_or(defaults.signing_secret),
            revocation_hot_timeout: env_millis("IAM_REVOCATION_HOT_TIMEOUT_MS").unwrap_or(defaults.revocation_hot_timeout),
            revocation_cleanup_interval: env_secs("IAM_REVOCATION_CLEANUP_INTERVAL_SECS")
                .unwrap_or(defaults.revocation_cleanup_interval),
            db_pool_min: env::var("IAM_DB_POOL_MIN").ok().and_then(|v| v.parse().ok()).unwrap_or(defaults.db_pool_min),
            db_pool_max: env::var("IAM_DB_POOL_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(defaults.db_pool_max),
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env::var(name).ok().and_then(|v| v.parse().ok()).map(Duration::from_secs)
}

fn env_millis(name: &str) -> Option<Duration> {
    env::var(name).ok().and_then(|v| v.parse().ok()).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.access_token_ttl, Duration::from_secs(900));
        assert_eq!(config.revocation_hot_timeout, Duration::from_millis(50));
    }
}
