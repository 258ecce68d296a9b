//! Check runner — the polling loop driving a set of checks over a set
//! of instances until every instance resolves.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use fleetgate_core::{Instance, InstanceId, StatusSource};

use crate::check::{Check, Observation, Verdict};

/// Configuration errors detected before the polling loop starts.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no checks configured")]
    NoChecks,

    #[error("no success-gating check configured, the run could never resolve meaningfully")]
    NoSuccessCriterion,
}

/// Final verdict for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Aborted { reason: String },
}

/// Mapping from instance to final outcome, built incrementally during a
/// run and immutable once the run ends.
#[derive(Debug, Default, Serialize)]
pub struct RunResult {
    outcomes: BTreeMap<InstanceId, Outcome>,
    iterations: u64,
}

impl RunResult {
    fn record(&mut self, instance: &InstanceId, outcome: Outcome) {
        self.outcomes.insert(instance.clone(), outcome);
    }

    pub fn outcome(&self, instance: &str) -> Option<&Outcome> {
        self.outcomes.get(instance)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of polling iterations the run performed.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Names of instances that converged, in name order.
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Succeeded))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Aborted instances with their reasons, in name order.
    pub fn aborted(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(name, o)| match o {
                Outcome::Aborted { reason } => Some((name.as_str(), reason.as_str())),
                Outcome::Succeeded => None,
            })
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.aborted().is_empty()
    }
}

/// Drives the polling loop: holds the checks, a poll delay, and a
/// status source, and iterates over the active instance set until every
/// instance resolves.
///
/// Aborts are expected outcomes recorded in the [`RunResult`];
/// [`check`](Self::check) returns an error only for configuration
/// mistakes, before any polling happens.
pub struct CheckRunner<S> {
    source: S,
    checks: Vec<Box<dyn Check>>,
    delay: Duration,
    verbose: bool,
}

impl<S: StatusSource> CheckRunner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            checks: Vec::new(),
            delay: Duration::from_secs(1),
            verbose: false,
        }
    }

    pub fn with_check(mut self, check: Box<dyn Check>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Log still-awaiting instances at info level every iteration.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the polling loop over `instances` until every instance
    /// resolves. An empty set returns an empty result immediately, with
    /// zero iterations and no sleeping.
    pub async fn check(&mut self, instances: &[Instance]) -> Result<RunResult, EngineError> {
        if self.checks.is_empty() {
            return Err(EngineError::NoChecks);
        }
        if !self.checks.iter().any(|c| c.gates_success()) {
            return Err(EngineError::NoSuccessCriterion);
        }

        let mut result = RunResult::default();
        let mut active: Vec<Instance> = instances.to_vec();

        while !active.is_empty() {
            if result.iterations > 0 {
                sleep(self.delay).await;
            }
            result.iterations += 1;

            let mut remaining = Vec::with_capacity(active.len());
            for instance in active {
                let snapshot = match self.source.fetch(&instance).await {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        debug!(instance = %instance.name, error = %e, "status fetch failed");
                        None
                    }
                };
                let observation = Observation::new(snapshot, Instant::now());

                match self.evaluate(&instance, &observation) {
                    Verdict::Continue => {
                        if self.verbose {
                            info!(
                                instance = %instance.name,
                                iteration = result.iterations,
                                reachable = observation.reachable(),
                                "still awaiting"
                            );
                        }
                        remaining.push(instance);
                    }
                    Verdict::Succeeded => {
                        info!(
                            instance = %instance.name,
                            iteration = result.iterations,
                            "instance converged"
                        );
                        self.discard(&instance.name);
                        result.record(&instance.name, Outcome::Succeeded);
                    }
                    Verdict::Aborted { reason } => {
                        warn!(
                            instance = %instance.name,
                            iteration = result.iterations,
                            %reason,
                            "instance aborted"
                        );
                        self.discard(&instance.name);
                        result.record(&instance.name, Outcome::Aborted { reason });
                    }
                }
            }
            active = remaining;
        }

        Ok(result)
    }

    /// Evaluate every check in fixed order and combine: aborted if any
    /// check aborts (first abort wins), succeeded once every
    /// success-gating check succeeds, else continue.
    fn evaluate(&mut self, instance: &Instance, observation: &Observation) -> Verdict {
        let mut aborted: Option<String> = None;
        let mut all_gates_met = true;

        for check in &mut self.checks {
            match check.evaluate(instance, observation) {
                Verdict::Succeeded => {}
                Verdict::Continue => {
                    if check.gates_success() {
                        all_gates_met = false;
                    }
                }
                Verdict::Aborted { reason } => {
                    if aborted.is_none() {
                        aborted = Some(reason);
                    }
                }
            }
        }

        if let Some(reason) = aborted {
            Verdict::Aborted { reason }
        } else if all_gates_met {
            Verdict::Succeeded
        } else {
            Verdict::Continue
        }
    }

    fn discard(&mut self, instance: &InstanceId) {
        for check in &mut self.checks {
            check.forget(instance);
        }
    }
}
