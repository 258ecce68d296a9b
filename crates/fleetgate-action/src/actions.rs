//! Await actions — the runnable down/up convergence operations.

use thiserror::Error;
use tracing::info;

use fleetgate_core::{AwaitSettings, Instance, StatusSource};
use fleetgate_engine::{
    AvailableCheck, CheckRunner, EngineError, RunResult, TimeoutCheck, UnavailableCheck,
    UnchangedCheck,
};

use crate::options::{AwaitDownOptions, AwaitUpOptions};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid setting {key}: {value:?} is not a duration")]
    InvalidSetting { key: String, value: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{failed} of {total} instance(s) failed to converge: {reasons}")]
    Aborted {
        failed: usize,
        total: usize,
        reasons: String,
    },
}

/// Awaits instances into a sustained-unreachable, stable condition.
///
/// Composes the timeout safety bound with the unavailable and unchanged
/// windows.
pub struct AwaitDownAction<S> {
    source: S,
    options: AwaitDownOptions,
    settings: Option<AwaitSettings>,
}

impl<S: StatusSource> AwaitDownAction<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: AwaitDownOptions::default(),
            settings: None,
        }
    }

    /// fleet.toml `[await.down]` settings, consulted for every duration
    /// not set explicitly.
    pub fn with_settings(mut self, settings: AwaitSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_options(mut self, options: AwaitDownOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn perform(self, instances: &[Instance]) -> Result<RunResult, ActionError> {
        if instances.is_empty() {
            info!("no instances to await down");
            return Ok(RunResult::default());
        }
        let resolved = self.options.resolve(self.settings.as_ref())?;
        info!(instances = %names(instances), "awaiting instance(s) down");

        let mut runner = CheckRunner::new(self.source)
            .with_delay(resolved.delay)
            .with_verbose(resolved.verbose)
            .with_check(Box::new(TimeoutCheck::new(
                resolved.state_time,
                resolved.constant_time,
            )))
            .with_check(Box::new(UnavailableCheck::new(resolved.window_time)))
            .with_check(Box::new(UnchangedCheck::new(resolved.await_time)));

        finish(runner.check(instances).await?, instances.len(), "down")
    }
}

/// Awaits instances into a sustained-reachable, stable condition.
///
/// Composes the timeout safety bound with the available and unchanged
/// windows.
pub struct AwaitUpAction<S> {
    source: S,
    options: AwaitUpOptions,
    settings: Option<AwaitSettings>,
}

impl<S: StatusSource> AwaitUpAction<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: AwaitUpOptions::default(),
            settings: None,
        }
    }

    /// fleet.toml `[await.up]` settings, consulted for every duration
    /// not set explicitly.
    pub fn with_settings(mut self, settings: AwaitSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_options(mut self, options: AwaitUpOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn perform(self, instances: &[Instance]) -> Result<RunResult, ActionError> {
        if instances.is_empty() {
            info!("no instances to await up");
            return Ok(RunResult::default());
        }
        let resolved = self.options.resolve(self.settings.as_ref())?;
        info!(instances = %names(instances), "awaiting instance(s) up");

        let mut runner = CheckRunner::new(self.source)
            .with_delay(resolved.delay)
            .with_verbose(resolved.verbose)
            .with_check(Box::new(TimeoutCheck::new(
                resolved.state_time,
                resolved.constant_time,
            )))
            .with_check(Box::new(AvailableCheck::new(resolved.window_time)))
            .with_check(Box::new(UnchangedCheck::new(resolved.await_time)));

        finish(runner.check(instances).await?, instances.len(), "up")
    }
}

fn names(instances: &[Instance]) -> String {
    instances
        .iter()
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Log the run summary and surface aborted instances as one aggregated
/// error; succeeded instances are reported either way.
fn finish(
    result: RunResult,
    total: usize,
    direction: &str,
) -> Result<RunResult, ActionError> {
    let succeeded = result.succeeded();
    let aborted = result.aborted();
    info!(
        direction,
        succeeded = succeeded.len(),
        aborted = aborted.len(),
        iterations = result.iterations(),
        converged = %succeeded.join(", "),
        "await finished"
    );

    if aborted.is_empty() {
        return Ok(result);
    }
    let reasons = aborted
        .iter()
        .map(|(name, reason)| format!("{name}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ");
    Err(ActionError::Aborted {
        failed: aborted.len(),
        total,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetgate_core::StatusSnapshot;
    use fleetgate_core::FetchError;
    use std::collections::BTreeMap;
    use std::time::Duration;

    /// Source for an instance set that never answers its endpoint.
    struct AlwaysDown;

    impl StatusSource for AlwaysDown {
        async fn fetch(&self, _instance: &Instance) -> Result<StatusSnapshot, FetchError> {
            Err(FetchError::Connect("connection refused".to_string()))
        }
    }

    /// Source for an instance set stuck in "starting" forever.
    struct AlwaysStarting;

    impl StatusSource for AlwaysStarting {
        async fn fetch(&self, _instance: &Instance) -> Result<StatusSnapshot, FetchError> {
            Ok(StatusSnapshot::reachable("starting", BTreeMap::new()))
        }
    }

    /// Source for an instance set steadily reporting "ready".
    struct AlwaysReady;

    impl StatusSource for AlwaysReady {
        async fn fetch(&self, _instance: &Instance) -> Result<StatusSnapshot, FetchError> {
            Ok(StatusSnapshot::reachable("ready", BTreeMap::new()))
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn instances(names: &[&str]) -> Vec<Instance> {
        names
            .iter()
            .map(|n| Instance::new(n, "127.0.0.1:0"))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn empty_instance_set_is_a_no_op() {
        let result = AwaitDownAction::new(AlwaysDown).perform(&[]).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.iterations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn down_action_succeeds_for_dead_instances() {
        let options = AwaitDownOptions {
            utilisation_time: Some(secs(3)),
            await_time: Some(secs(1)),
            ..Default::default()
        };
        let result = AwaitDownAction::new(AlwaysDown)
            .with_options(options)
            .perform(&instances(&["author", "publish"]))
            .await
            .unwrap();

        assert_eq!(result.succeeded(), vec!["author", "publish"]);
        assert!(result.all_succeeded());
    }

    #[tokio::test(start_paused = true)]
    async fn down_action_aborts_instances_that_stay_up() {
        let options = AwaitDownOptions {
            constant_time: Some(secs(5)),
            state_time: Some(secs(3)),
            ..Default::default()
        };
        let err = AwaitDownAction::new(AlwaysReady)
            .with_options(options)
            .perform(&instances(&["author"]))
            .await
            .unwrap_err();

        match err {
            ActionError::Aborted {
                failed,
                total,
                reasons,
            } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 1);
                assert!(reasons.contains("author"));
                assert!(reasons.contains("timeout"));
            }
            other => panic!("expected aborted error, got {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn up_action_succeeds_for_stably_ready_instances() {
        let options = AwaitUpOptions {
            stable_time: Some(secs(2)),
            await_time: Some(secs(2)),
            ..Default::default()
        };
        let result = AwaitUpAction::new(AlwaysReady)
            .with_options(options)
            .perform(&instances(&["api"]))
            .await
            .unwrap();
        assert_eq!(result.succeeded(), vec!["api"]);
        assert_eq!(result.iterations(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn up_action_aborts_an_instance_stuck_starting() {
        // Stuck in "starting": the state window fills long before the
        // available window can ever complete.
        let options = AwaitUpOptions {
            state_time: Some(secs(2)),
            stable_time: Some(secs(100)),
            ..Default::default()
        };
        let err = AwaitUpAction::new(AlwaysStarting)
            .with_options(options)
            .perform(&instances(&["api"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("state timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_setting_fails_before_any_polling() {
        let settings = AwaitSettings {
            delay: Some("soon".to_string()),
            ..Default::default()
        };
        let err = AwaitDownAction::new(AlwaysDown)
            .with_settings(settings)
            .perform(&instances(&["author"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidSetting { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_failure_reports_both_sides() {
        /// Mixed fleet: "dead" never answers, "alive" never stops.
        struct Mixed;

        impl StatusSource for Mixed {
            async fn fetch(&self, instance: &Instance) -> Result<StatusSnapshot, FetchError> {
                if instance.name == "dead" {
                    Err(FetchError::Connect("connection refused".to_string()))
                } else {
                    Ok(StatusSnapshot::reachable("ready", BTreeMap::new()))
                }
            }
        }

        let options = AwaitDownOptions {
            utilisation_time: Some(secs(1)),
            await_time: Some(secs(1)),
            state_time: Some(secs(5)),
            constant_time: Some(secs(8)),
            ..Default::default()
        };
        let err = AwaitDownAction::new(Mixed)
            .with_options(options)
            .perform(&instances(&["alive", "dead"]))
            .await
            .unwrap_err();

        match err {
            ActionError::Aborted {
                failed,
                total,
                reasons,
            } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 2);
                assert!(reasons.contains("alive"));
                assert!(!reasons.contains("dead"));
            }
            other => panic!("expected aborted error, got {other}"),
        }
    }
}
