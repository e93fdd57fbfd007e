//! Core runtime configuration.
//!
//! # Invariants
//! - `CoreConfig::default()` reproduces the production storefront caps
//!   (12 featured, 24 recent, 36 most popular) and ascending sort order.
//! - Environment overrides are all-or-nothing: one malformed value rejects
//!   the whole configuration.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const ENV_CACHE_TTL_SECS: &str = "CATALOG_CACHE_TTL_SECS";
pub const ENV_CACHE_CAPACITY: &str = "CATALOG_CACHE_CAPACITY";
pub const ENV_LOG_LEVEL: &str = "CATALOG_LOG_LEVEL";

/// Sort direction for ranked storefront subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Per-subset caps and ordering for storefront views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorefrontLimits {
    pub featured: u32,
    pub recent: u32,
    pub most_popular: u32,
    /// Direction of the `approved_date` sort for `recent`.
    pub recent_order: SortDirection,
    /// Direction of the `avg_rate` sort for `most_popular`.
    pub popular_order: SortDirection,
}

impl Default for StorefrontLimits {
    fn default() -> Self {
        Self {
            featured: 12,
            recent: 24,
            most_popular: 36,
            recent_order: SortDirection::Ascending,
            popular_order: SortDirection::Ascending,
        }
    }
}

/// Cache backend sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub max_capacity: u64,
    pub default_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            default_ttl: Duration::from_secs(900),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub cache: CacheSettings,
    pub storefront: StorefrontLimits,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cache: CacheSettings::default(),
            storefront: StorefrontLimits::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Builds configuration from defaults plus process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from defaults plus overrides returned by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            let secs = parse_positive(ENV_CACHE_TTL_SECS, &raw)?;
            config.cache.default_ttl = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            config.cache.max_capacity = parse_positive(ENV_CACHE_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            let level = raw.trim().to_ascii_lowercase();
            if !matches!(
                level.as_str(),
                "trace" | "debug" | "info" | "warn" | "warning" | "error"
            ) {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    value: raw,
                });
            }
            config.log_level = level;
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
