//! Await option resolution.
//!
//! Every duration resolves once, before the run starts, with the
//! precedence: explicit per-call option > fleet.toml setting >
//! built-in default. A setting that fails to parse is a configuration
//! error, never silently defaulted.

use std::time::Duration;

use fleetgate_core::{parse_duration, AwaitSettings};

use crate::actions::ActionError;

// Built-in defaults.
const DELAY: Duration = Duration::from_secs(1);
const STATE_TIME: Duration = Duration::from_secs(2 * 60);
const CONSTANT_TIME: Duration = Duration::from_secs(10 * 60);
const UTILISATION_TIME: Duration = Duration::from_secs(10);
const STABLE_TIME: Duration = Duration::from_secs(10);
const AWAIT_TIME: Duration = Duration::from_secs(3);
const VERBOSE: bool = true;

/// Explicit per-call overrides for the down direction. Unset fields
/// fall through to the fleet.toml setting, then to the default.
#[derive(Debug, Clone, Default)]
pub struct AwaitDownOptions {
    pub delay: Option<Duration>,
    pub state_time: Option<Duration>,
    pub constant_time: Option<Duration>,
    pub utilisation_time: Option<Duration>,
    pub await_time: Option<Duration>,
    pub verbose: Option<bool>,
}

/// Explicit per-call overrides for the up direction.
#[derive(Debug, Clone, Default)]
pub struct AwaitUpOptions {
    pub delay: Option<Duration>,
    pub state_time: Option<Duration>,
    pub constant_time: Option<Duration>,
    pub stable_time: Option<Duration>,
    pub await_time: Option<Duration>,
    pub verbose: Option<bool>,
}

/// Fully resolved durations for one await run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub delay: Duration,
    pub state_time: Duration,
    pub constant_time: Duration,
    /// Unavailable window (down) or available window (up).
    pub window_time: Duration,
    pub await_time: Duration,
    pub verbose: bool,
}

impl AwaitDownOptions {
    pub(crate) fn resolve(
        &self,
        settings: Option<&AwaitSettings>,
    ) -> Result<Resolved, ActionError> {
        Ok(Resolved {
            delay: duration(self.delay, settings, |s| &s.delay, "await.down.delay", DELAY)?,
            state_time: duration(
                self.state_time,
                settings,
                |s| &s.state_time,
                "await.down.state_time",
                STATE_TIME,
            )?,
            constant_time: duration(
                self.constant_time,
                settings,
                |s| &s.constant_time,
                "await.down.constant_time",
                CONSTANT_TIME,
            )?,
            window_time: duration(
                self.utilisation_time,
                settings,
                |s| &s.utilisation_time,
                "await.down.utilisation_time",
                UTILISATION_TIME,
            )?,
            await_time: duration(
                self.await_time,
                settings,
                |s| &s.await_time,
                "await.down.await_time",
                AWAIT_TIME,
            )?,
            verbose: self
                .verbose
                .or(settings.and_then(|s| s.verbose))
                .unwrap_or(VERBOSE),
        })
    }
}

impl AwaitUpOptions {
    pub(crate) fn resolve(
        &self,
        settings: Option<&AwaitSettings>,
    ) -> Result<Resolved, ActionError> {
        Ok(Resolved {
            delay: duration(self.delay, settings, |s| &s.delay, "await.up.delay", DELAY)?,
            state_time: duration(
                self.state_time,
                settings,
                |s| &s.state_time,
                "await.up.state_time",
                STATE_TIME,
            )?,
            constant_time: duration(
                self.constant_time,
                settings,
                |s| &s.constant_time,
                "await.up.constant_time",
                CONSTANT_TIME,
            )?,
            window_time: duration(
                self.stable_time,
                settings,
                |s| &s.stable_time,
                "await.up.stable_time",
                STABLE_TIME,
            )?,
            await_time: duration(
                self.await_time,
                settings,
                |s| &s.await_time,
                "await.up.await_time",
                AWAIT_TIME,
            )?,
            verbose: self
                .verbose
                .or(settings.and_then(|s| s.verbose))
                .unwrap_or(VERBOSE),
        })
    }
}

fn duration(
    explicit: Option<Duration>,
    settings: Option<&AwaitSettings>,
    field: impl Fn(&AwaitSettings) -> &Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, ActionError> {
    if let Some(value) = explicit {
        return Ok(value);
    }
    match settings.and_then(|s| field(s).as_ref()) {
        Some(raw) => parse_duration(raw).ok_or_else(|| ActionError::InvalidSetting {
            key: key.to_string(),
            value: raw.clone(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn defaults_apply_without_settings() {
        let resolved = AwaitDownOptions::default().resolve(None).unwrap();
        assert_eq!(resolved.delay, secs(1));
        assert_eq!(resolved.state_time, secs(120));
        assert_eq!(resolved.constant_time, secs(600));
        assert_eq!(resolved.window_time, secs(10));
        assert_eq!(resolved.await_time, secs(3));
        assert!(resolved.verbose);
    }

    #[test]
    fn settings_override_defaults() {
        let settings = AwaitSettings {
            delay: Some("500ms".to_string()),
            utilisation_time: Some("30s".to_string()),
            verbose: Some(false),
            ..Default::default()
        };
        let resolved = AwaitDownOptions::default()
            .resolve(Some(&settings))
            .unwrap();
        assert_eq!(resolved.delay, Duration::from_millis(500));
        assert_eq!(resolved.window_time, secs(30));
        assert!(!resolved.verbose);
        // Untouched fields keep defaults.
        assert_eq!(resolved.await_time, secs(3));
    }

    #[test]
    fn explicit_options_override_settings() {
        let settings = AwaitSettings {
            delay: Some("5s".to_string()),
            ..Default::default()
        };
        let options = AwaitDownOptions {
            delay: Some(secs(2)),
            ..Default::default()
        };
        let resolved = options.resolve(Some(&settings)).unwrap();
        assert_eq!(resolved.delay, secs(2));
    }

    #[test]
    fn invalid_setting_fails_fast() {
        let settings = AwaitSettings {
            constant_time: Some("forever".to_string()),
            ..Default::default()
        };
        let err = AwaitDownOptions::default()
            .resolve(Some(&settings))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("await.down.constant_time"));
        assert!(message.contains("forever"));
    }

    #[test]
    fn up_direction_uses_stable_time() {
        let settings = AwaitSettings {
            stable_time: Some("42s".to_string()),
            // The up direction never reads utilisation_time.
            utilisation_time: Some("1s".to_string()),
            ..Default::default()
        };
        let resolved = AwaitUpOptions::default().resolve(Some(&settings)).unwrap();
        assert_eq!(resolved.window_time, secs(42));
    }
}
