//! Configuration validation module.
//!
//! Collects every problem in one pass so a bad deployment fails at startup
//! with the full list, not one error per restart.

use crate::{AppConfig, StorageBackend};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// JWT secret is too short.
    JwtSecretTooShort { actual: usize, minimum: usize },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: u32, maximum: u32 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Value must be positive.
    NonPositive { name: String },
    /// Password hash cost is invalid.
    InvalidHashCost { value: u32, minimum: u32, maximum: u32 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JwtSecretTooShort { actual, minimum } => {
                write!(f, "JWT secret too short: {} characters (minimum {})", actual, minimum)
            }
            Self::InvalidPoolSize { min, max } => {
                write!(f, "Invalid pool size: min ({}) cannot be greater than max ({})", min, max)
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositive { name } => write!(f, "'{}' must be positive", name),
            Self::InvalidHashCost { value, minimum, maximum } => {
                write!(
                    f,
                    "Invalid password hash cost: {} (must be between {} and {})",
                    value, minimum, maximum
                )
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Minimum JWT secret length for HS256.
    const MIN_JWT_SECRET_LENGTH: usize = 32;
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 1000;
    /// Minimum Argon2 hash cost.
    const MIN_HASH_COST: u32 = 1;
    /// Maximum Argon2 hash cost.
    const MAX_HASH_COST: u32 = 256;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error", "off"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_security(config, &mut errors);
        Self::validate_database(config, &mut errors);
        Self::validate_redis(config, &mut errors);
        Self::validate_cache(config, &mut errors);
        Self::validate_observability(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_security(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let security = &config.security;
        if security.jwt_secret.len() < Self::MIN_JWT_SECRET_LENGTH {
            errors.push(ConfigValidationError::JwtSecretTooShort {
                actual: security.jwt_secret.len(),
                minimum: Self::MIN_JWT_SECRET_LENGTH,
            });
        }

        if !(Self::MIN_HASH_COST..=Self::MAX_HASH_COST).contains(&security.password_hash_cost) {
            errors.push(ConfigValidationError::InvalidHashCost {
                value: security.password_hash_cost,
                minimum: Self::MIN_HASH_COST,
                maximum: Self::MAX_HASH_COST,
            });
        }

        if security.jwt_expiration_secs == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "security.jwt_expiration_secs".to_string(),
            });
        }
    }

    fn validate_database(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let database = &config.database;
        if database.backend == StorageBackend::Memory {
            return;
        }

        if !database.url.starts_with("mysql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with mysql://".to_string(),
            });
        }

        if database.min_connections > database.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: database.min_connections,
                max: database.max_connections,
            });
        }
        if database.max_connections > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: database.max_connections,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        if database.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "database.connect_timeout_secs".to_string(),
            });
        }
    }

    fn validate_redis(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let redis = &config.redis;
        if !redis.enabled {
            return;
        }

        match Url::parse(&redis.url) {
            Ok(url) if url.scheme() == "redis" || url.scheme() == "rediss" => {}
            _ => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            }),
        }

        if redis.pool_size == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "redis.pool_size".to_string(),
            });
        } else if redis.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: redis.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_cache(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.cache.invalidation_queue_capacity == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "cache.invalidation_queue_capacity".to_string(),
            });
        }
    }

    /// Accepts a plain level or an `EnvFilter` directive list whose levels
    /// are all valid.
    fn validate_observability(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let value = &config.observability.log_level;
        let valid = !value.trim().is_empty()
            && value.split(',').all(|directive| {
                let level = directive.rsplit('=').next().unwrap_or(directive);
                Self::VALID_LOG_LEVELS.contains(&level.trim().to_lowercase().as_str())
            });

        if !valid {
            errors.push(ConfigValidationError::InvalidLogLevel { value: value.clone() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.security.jwt_secret = "short".to_string();
        config.database.min_connections = 50;
        config.redis.url = "http://localhost".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ConfigValidationError::JwtSecretTooShort { actual: 5, minimum: 32 }));
        assert!(errors.contains(&ConfigValidationError::InvalidPoolSize { min: 50, max: 20 }));
        assert!(errors.contains(&ConfigValidationError::InvalidLogLevel { value: "loud".to_string() }));
    }

    #[test]
    fn test_memory_backend_skips_database_checks() {
        let mut config = AppConfig::default();
        config.database.backend = StorageBackend::Memory;
        config.database.url = String::new();
        config.redis.enabled = false;
        config.redis.url = String::new();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_log_directives_are_accepted() {
        let mut config = AppConfig::default();
        config.observability.log_level = "info,scribe_service=debug".to_string();
        assert!(ConfigValidator::validate(&config).is_ok());

        config.observability.log_level = "info,scribe_service=chatty".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigValidationError::NonPositive {
            name: "cache.invalidation_queue_capacity".to_string(),
        };
        assert_eq!(err.to_string(), "'cache.invalidation_queue_capacity' must be positive");
    }
}
