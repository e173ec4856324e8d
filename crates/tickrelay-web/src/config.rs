use std::env;
use std::time::Duration;

use thiserror::Error;
use tickrelay_core::CachePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FMP_API_KEY must be set")]
    MissingApiKey,
}

/// Server configuration derived from environment variables, read once at
/// process start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Upstream FMP API key. Absence is fatal.
    pub api_key: String,

    pub rate_per_day: u32,
    pub rate_per_hour: u32,
    pub bars_rate_per_minute: u32,

    pub bars_ttl: Duration,
    pub events_ttl: Duration,
    pub cache_capacity: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("FMP_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            bind: env_str("TICKRELAY_BIND", "0.0.0.0"),
            port: env_u16("PORT", 10_000),
            api_key,
            rate_per_day: env_u32("TICKRELAY_RATE_PER_DAY", 200),
            rate_per_hour: env_u32("TICKRELAY_RATE_PER_HOUR", 50),
            bars_rate_per_minute: env_u32("TICKRELAY_BARS_RATE_PER_MINUTE", 30),
            bars_ttl: Duration::from_secs(env_u64("TICKRELAY_BARS_TTL_SECS", 300)),
            events_ttl: Duration::from_secs(env_u64("TICKRELAY_EVENTS_TTL_SECS", 3_600)),
            cache_capacity: env_u64("TICKRELAY_CACHE_CAPACITY", 100) as usize,
        })
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            bars_freshness: self.bars_ttl,
            events_freshness: self.events_ttl,
            capacity: self.cache_capacity,
        }
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses a unique variable name so parallel execution cannot
    // interfere.

    #[test]
    fn unset_variable_falls_back_to_default() {
        assert_eq!(env_u32("TICKRELAY_TEST_UNSET_U32", 42), 42);
        assert_eq!(env_str("TICKRELAY_TEST_UNSET_STR", "fallback"), "fallback");
    }

    #[test]
    fn set_variable_is_parsed_and_trimmed() {
        env::set_var("TICKRELAY_TEST_SET_U32", " 7 ");
        assert_eq!(env_u32("TICKRELAY_TEST_SET_U32", 42), 7);
        env::remove_var("TICKRELAY_TEST_SET_U32");
    }

    #[test]
    fn unparseable_variable_falls_back_to_default() {
        env::set_var("TICKRELAY_TEST_BAD_U16", "not-a-number");
        assert_eq!(env_u16("TICKRELAY_TEST_BAD_U16", 10_000), 10_000);
        env::remove_var("TICKRELAY_TEST_BAD_U16");
    }

    #[test]
    fn cache_policy_reflects_configured_ttls() {
        let config = ServerConfig {
            bind: String::from("0.0.0.0"),
            port: 10_000,
            api_key: String::from("test-key"),
            rate_per_day: 200,
            rate_per_hour: 50,
            bars_rate_per_minute: 30,
            bars_ttl: Duration::from_secs(120),
            events_ttl: Duration::from_secs(900),
            cache_capacity: 16,
        };

        let policy = config.cache_policy();
        assert_eq!(policy.bars_freshness, Duration::from_secs(120));
        assert_eq!(policy.events_freshness, Duration::from_secs(900));
        assert_eq!(policy.capacity, 16);
    }
}
