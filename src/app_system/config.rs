use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::topup_actor::TopUpSettings;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_path: PathBuf,
    /// Base URL of the payment server functions. Top-ups are unavailable without it.
    pub payment_api_url: Option<String>,
    pub payment_api_key: Option<String>,
    pub poll_interval_ms: u64,
    pub topup_timeout_secs: u64,
    pub dismiss_delay_ms: u64,
    pub channel_buffer: usize,
}

impl Config {
    pub fn load() -> Self {
        Self {
            store_path: PathBuf::from(try_load("WALLET_STORE_PATH", String::from("campus_wallet.json"))),
            payment_api_url: optional("PAYMENT_API_URL"),
            payment_api_key: optional("PAYMENT_API_KEY"),
            poll_interval_ms: try_load("TOPUP_POLL_INTERVAL_MS", 2000),
            topup_timeout_secs: try_load("TOPUP_TIMEOUT_SECS", 600),
            dismiss_delay_ms: try_load("TOPUP_DISMISS_DELAY_MS", 2000),
            channel_buffer: try_load::<usize>("CHANNEL_BUFFER", 32).max(1),
        }
    }

    pub fn topup_settings(&self) -> TopUpSettings {
        TopUpSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            timeout: Duration::from_secs(self.topup_timeout_secs),
            dismiss_delay: Duration::from_millis(self.dismiss_delay_ms),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn optional(key: &str) -> Option<String> {
    let value = var(key);
    if value.is_none() {
        info!("{key} not set");
    }
    value
}

/// Falls back to `default` when the variable is missing or does not parse.
fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value: {e}, using default: {default}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_the_dialog_timing() {
        let config = Config {
            store_path: "w.json".into(),
            payment_api_url: None,
            payment_api_key: None,
            poll_interval_ms: 2000,
            topup_timeout_secs: 600,
            dismiss_delay_ms: 2000,
            channel_buffer: 32,
        };
        assert_eq!(config.topup_settings(), TopUpSettings::default());
    }

    #[test]
    fn missing_values_fall_back_to_the_default() {
        let value: u64 = try_load("CAMPUS_WALLET_TEST_UNSET_VARIABLE", 2000);
        assert_eq!(value, 2000);
    }
}
