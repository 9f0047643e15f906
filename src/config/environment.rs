// ABOUTME: Runtime tuning for push read from environment variables.
// ABOUTME: Covers staging/startup timeouts and the upload retry bound.

use std::time::Duration;

pub const STAGING_TIMEOUT_VAR: &str = "CF_STAGING_TIMEOUT";
pub const STARTUP_TIMEOUT_VAR: &str = "CF_STARTUP_TIMEOUT";

/// Attempts made for a bits or droplet upload before giving up.
pub const PUSH_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushConfig {
    /// Max wait for buildpack staging.
    pub staging_timeout: Duration,
    /// Max wait for app instance startup.
    pub startup_timeout: Duration,
    pub upload_retries: u32,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            staging_timeout: Duration::from_secs(15 * 60),
            startup_timeout: Duration::from_secs(5 * 60),
            upload_retries: PUSH_RETRIES,
        }
    }
}

impl PushConfig {
    /// Build from the process environment, falling back to defaults for
    /// unset or unparseable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            staging_timeout: minutes_from_env(STAGING_TIMEOUT_VAR)
                .unwrap_or(defaults.staging_timeout),
            startup_timeout: minutes_from_env(STARTUP_TIMEOUT_VAR)
                .unwrap_or(defaults.startup_timeout),
            upload_retries: defaults.upload_retries,
        }
    }
}

fn minutes_from_env(var: &str) -> Option<Duration> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 => match minutes.checked_mul(60) {
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => {
                tracing::warn!("ignoring out-of-range {}={:?}, using default", var, raw);
                None
            }
        },
        _ => {
            tracing::warn!("ignoring invalid {}={:?}, using default", var, raw);
            None
        }
    }
}
