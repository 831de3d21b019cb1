//! Service configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/splitr/config.toml)
//! 2. Fall back to built-in defaults
//!
//! Environment variables are applied last:
//! - `SPLITR_RECURRING_INTERVAL`: seconds between scheduler runs (0 disables)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable overriding the recurring scheduler interval
pub const RECURRING_INTERVAL_ENV: &str = "SPLITR_RECURRING_INTERVAL";

/// Longest accepted analytics cache lifetime (one year)
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;
/// Longest accepted suggestion mining window (ten years)
pub const MAX_SUGGESTION_WINDOW_DAYS: i64 = 3650;
/// Longest accepted interval between scheduler runs (one year)
pub const MAX_RECURRING_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SplitrConfig {
    /// How long a computed analytics result is served from cache
    pub cache_ttl_secs: u64,
    /// Trailing window of expenses mined for suggestions
    pub suggestion_window_days: i64,
    /// Number of suggestions kept per regeneration
    pub max_stored_suggestions: usize,
    /// Number of suggestions returned by a listing
    pub max_listed_suggestions: usize,
    /// Seconds between automatic recurring-expense runs (0 = disabled)
    pub recurring_interval_secs: u64,
}

impl Default for SplitrConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 15 * 60,
            suggestion_window_days: 90,
            max_stored_suggestions: 10,
            max_listed_suggestions: 5,
            recurring_interval_secs: 0,
        }
    }
}

impl SplitrConfig {
    /// Load configuration (explicit path, then data dir override, then defaults)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let mut config = match candidate {
            Some(p) if p.exists() => {
                let content = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", p.display(), e))
                })?;
                tracing::debug!(path = %p.display(), "Loaded config override");
                Self::from_toml_str(&content)?
            }
            Some(p) if path.is_some() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )))
            }
            _ => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Parse configuration from TOML content, filling gaps with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(analytics) = raw.analytics {
            if let Some(ttl) = analytics.cache_ttl_secs {
                if ttl > MAX_CACHE_TTL_SECS {
                    return Err(Error::Config(format!(
                        "analytics.cache_ttl_secs must be at most {}, got {}",
                        MAX_CACHE_TTL_SECS, ttl
                    )));
                }
                config.cache_ttl_secs = ttl;
            }
        }

        if let Some(suggestions) = raw.suggestions {
            if let Some(days) = suggestions.window_days {
                if !(1..=MAX_SUGGESTION_WINDOW_DAYS).contains(&days) {
                    return Err(Error::Config(format!(
                        "suggestions.window_days must be between 1 and {}, got {}",
                        MAX_SUGGESTION_WINDOW_DAYS, days
                    )));
                }
                config.suggestion_window_days = days;
            }
            if let Some(max) = suggestions.max_stored {
                config.max_stored_suggestions = max;
            }
            if let Some(max) = suggestions.max_listed {
                config.max_listed_suggestions = max;
            }
        }

        if let Some(scheduler) = raw.scheduler {
            if let Some(secs) = scheduler.recurring_interval_secs {
                if secs > MAX_RECURRING_INTERVAL_SECS {
                    return Err(Error::Config(format!(
                        "scheduler.recurring_interval_secs must be at most {}, got {}",
                        MAX_RECURRING_INTERVAL_SECS, secs
                    )));
                }
                config.recurring_interval_secs = secs;
            }
        }

        Ok(config)
    }

    /// Cache staleness threshold as a chrono duration
    pub fn cache_ttl(&self) -> chrono::Duration {
        // Fields are public, so clamp values that bypassed `from_toml_str`
        chrono::Duration::seconds(self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS) as i64)
    }

    /// Trailing suggestion window as a chrono duration, clamped to 1..=max days
    pub fn suggestion_window(&self) -> chrono::Duration {
        chrono::Duration::days(
            self.suggestion_window_days
                .clamp(1, MAX_SUGGESTION_WINDOW_DAYS),
        )
    }

    fn apply_env(&mut self) {
        let Some(secs) = std::env::var(RECURRING_INTERVAL_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        else {
            return;
        };
        if secs > MAX_RECURRING_INTERVAL_SECS {
            tracing::warn!(
                secs,
                max = MAX_RECURRING_INTERVAL_SECS,
                "Ignoring out-of-range {}",
                RECURRING_INTERVAL_ENV
            );
            return;
        }
        self.recurring_interval_secs = secs;
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("splitr").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    analytics: Option<RawAnalytics>,
    suggestions: Option<RawSuggestions>,
    scheduler: Option<RawScheduler>,
}

#[derive(Debug, Deserialize)]
struct RawAnalytics {
    cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestions {
    window_days: Option<i64>,
    max_stored: Option<usize>,
    max_listed: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawScheduler {
    recurring_interval_secs: Option<u64>,
}
