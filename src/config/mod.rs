/// 환경 변수 기반 서비스 설정
// region:    --- Imports
use chrono::{DateTime, TimeDelta, Utc};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

// endregion: --- Imports

// region:    --- Config Error
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
// endregion: --- Config Error

// region:    --- Config
/// 시간 단위 설정의 상한 (100년)
pub const MAX_HOURS: i64 = 24 * 365 * 100;

/// `start`로부터 `hours`시간 뒤. 표현할 수 없으면 None
pub fn hours_after(start: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_hours(hours).and_then(|delta| start.checked_add_signed(delta))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_reset: bool,
    pub kafka_brokers: String,
    pub kafka_group_id: String,
    pub kafka_topic: String,
    pub listing_duration_hours: i64,
    pub session_ttl_hours: i64,
    /// 0이면 만료 스케줄러를 띄우지 않는다
    pub expiry_interval_secs: u64,
}

impl Config {
    /// 프로세스 환경 변수에서 설정 로드
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로부터 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let config = Self {
            bind_addr: try_load(&lookup, "BIND_ADDR", "0.0.0.0:3000")?,
            database_url,
            db_max_connections: try_load(&lookup, "DB_MAX_CONNECTIONS", "5")?,
            db_reset: try_load(&lookup, "DB_RESET", "false")?,
            kafka_brokers: try_load(&lookup, "KAFKA_BROKERS", "localhost:9092")?,
            kafka_group_id: try_load(&lookup, "KAFKA_GROUP_ID", "auction-site-notifier")?,
            kafka_topic: try_load(&lookup, "KAFKA_TOPIC", "listing-events")?,
            listing_duration_hours: try_load(&lookup, "LISTING_DURATION_HOURS", "24")?,
            session_ttl_hours: try_load(&lookup, "SESSION_TTL_HOURS", "336")?,
            expiry_interval_secs: try_load(&lookup, "EXPIRY_INTERVAL_SECS", "0")?,
        };

        check_hours("LISTING_DURATION_HOURS", config.listing_duration_hours)?;
        check_hours("SESSION_TTL_HOURS", config.session_ttl_hours)?;

        Ok(config)
    }
}

fn check_hours(key: &'static str, hours: i64) -> Result<(), ConfigError> {
    if hours <= 0 {
        return Err(ConfigError::Invalid {
            key,
            message: "must be positive".to_string(),
        });
    }
    if hours > MAX_HOURS || hours_after(Utc::now(), hours).is_none() {
        return Err(ConfigError::Invalid {
            key,
            message: format!("must be at most {} hours", MAX_HOURS),
        });
    }
    Ok(())
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{:<12} --> {} 미설정, 기본값 사용: {}", "Config", key, default);
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        })
}
// endregion: --- Config

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/db")]))
                .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert!(!config.db_reset);
        assert_eq!(config.kafka_topic, "listing-events");
        assert_eq!(config.listing_duration_hours, 24);
        assert_eq!(config.session_ttl_hours, 336);
        assert_eq!(config.expiry_interval_secs, 0);
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("DB_RESET", "true"),
            ("EXPIRY_INTERVAL_SECS", "15"),
        ]))
        .unwrap();
        assert!(config.db_reset);
        assert_eq!(config.expiry_interval_secs, 15);

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("DB_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                ..
            }
        ));

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("LISTING_DURATION_HOURS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "LISTING_DURATION_HOURS",
                ..
            }
        ));
    }

    #[test]
    fn test_huge_hours_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("LISTING_DURATION_HOURS", "10000000000"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "LISTING_DURATION_HOURS",
                ..
            }
        ));

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("SESSION_TTL_HOURS", "9223372036854775807"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                ..
            }
        ));

        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("LISTING_DURATION_HOURS", &MAX_HOURS.to_string()),
        ]))
        .unwrap();
        assert_eq!(config.listing_duration_hours, MAX_HOURS);
    }

    #[test]
    fn test_hours_after() {
        let now = Utc::now();
        assert_eq!(hours_after(now, 2), Some(now + TimeDelta::hours(2)));
        assert_eq!(hours_after(now, 10_000_000_000), None);
        assert_eq!(hours_after(now, i64::MAX), None);
    }
}
// endregion: --- Tests
