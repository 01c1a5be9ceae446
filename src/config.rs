use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::reminders::Permission;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,

    // Companion worker
    pub refresh_interval_secs: u64,

    pub notifications_enabled: bool,
}

impl Config {
    pub fn from_env() -> ClientResult<Self> {
        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".into()),
            api_token: env::var("API_TOKEN").ok().filter(|s| !s.is_empty()),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 30)?,

            refresh_interval_secs: parse_var("REFRESH_INTERVAL_SECS", 300)?,

            notifications_enabled: parse_var("NOTIFICATIONS_ENABLED", true)?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Permission the log notifier reports for this process.
    pub fn notification_permission(&self) -> Permission {
        if self.notifications_enabled {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> ClientResult<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ClientError::Config(format!("{name} must be a valid value, got {raw:?}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_when_missing() {
        let value: u64 = parse_var("HABIT_CLIENT_TEST_MISSING_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("HABIT_CLIENT_TEST_BAD_NUMBER", "ten");
        let result: ClientResult<u64> = parse_var("HABIT_CLIENT_TEST_BAD_NUMBER", 1);
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_permission_follows_flag() {
        let mut config = Config {
            api_base_url: "http://localhost:8080/api".into(),
            api_token: None,
            request_timeout_secs: 30,
            refresh_interval_secs: 300,
            notifications_enabled: true,
        };
        assert_eq!(config.notification_permission(), Permission::Granted);
        config.notifications_enabled = false;
        assert_eq!(config.notification_permission(), Permission::Denied);
    }
}
