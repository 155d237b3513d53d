//! Configuration management module
//!
//! Loads and validates environment-based configuration.

use serde::Deserialize;
use std::env;
use thiserror::Error;

use crate::care::MAX_HISTORY_LIMIT;

/// Configuration errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid number format in environment variable {0}")]
    ParseError(&'static str),

    #[error("{0} out of range")]
    OutOfRange(&'static str),
}

/// Server configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Scheduling configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSettings {
    /// Seconds between background frequency recomputation sweeps
    pub sweep_interval_secs: u64,
    /// History entries returned when the client does not pass a limit
    pub history_default_limit: usize,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub schedule: ScheduleSettings,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 3600,
            history_default_limit: 20,
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        let port = parse_var("SERVER_PORT", "8080")?;
        let sweep_interval_secs: u64 = parse_var("SWEEP_INTERVAL_SECS", "3600")?;
        let history_default_limit: usize = parse_var("HISTORY_DEFAULT_LIMIT", "20")?;

        if sweep_interval_secs == 0 {
            return Err(SettingsError::OutOfRange("SWEEP_INTERVAL_SECS"));
        }
        if history_default_limit == 0 || history_default_limit > MAX_HISTORY_LIMIT {
            return Err(SettingsError::OutOfRange("HISTORY_DEFAULT_LIMIT"));
        }

        Ok(Self {
            server: ServerSettings {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
                port,
            },
            schedule: ScheduleSettings {
                sweep_interval_secs,
                history_default_limit,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, SettingsError> {
    env::var(name)
        .unwrap_or_else(|_| default.into())
        .parse()
        .map_err(|_| SettingsError::ParseError(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases share process-wide env vars, so they run in one test
    #[test]
    fn test_settings_from_env() {
        env::remove_var("SERVER_HOST");
        env::remove_var("SERVER_PORT");
        env::remove_var("SWEEP_INTERVAL_SECS");
        env::remove_var("HISTORY_DEFAULT_LIMIT");

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.schedule.sweep_interval_secs, 3600);
        assert_eq!(settings.schedule.history_default_limit, 20);

        env::set_var("SERVER_PORT", "3000");
        env::set_var("SWEEP_INTERVAL_SECS", "60");
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.schedule.sweep_interval_secs, 60);

        env::set_var("SERVER_PORT", "not-a-port");
        assert!(matches!(
            Settings::from_env(),
            Err(SettingsError::ParseError("SERVER_PORT"))
        ));
        env::remove_var("SERVER_PORT");

        env::set_var("HISTORY_DEFAULT_LIMIT", "500");
        assert!(matches!(
            Settings::from_env(),
            Err(SettingsError::OutOfRange("HISTORY_DEFAULT_LIMIT"))
        ));

        env::remove_var("HISTORY_DEFAULT_LIMIT");
        env::remove_var("SWEEP_INTERVAL_SECS");
    }
}
