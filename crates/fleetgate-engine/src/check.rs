//! Check strategies — pluggable convergence criteria.
//!
//! A check evaluates one instance's observation history and returns a
//! [`Verdict`] for the current iteration. Checks are independent: each
//! owns its own [`Progress`] map and never sees another check's state.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use fleetgate_core::{Instance, InstanceId, StatusSnapshot};

use crate::progress::Progress;

// ── Verdict ───────────────────────────────────────────────────────

/// Per-iteration outcome of one check for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Not yet resolved, keep polling.
    Continue,
    /// This check's criterion is met for this iteration.
    Succeeded,
    /// Fatal: the criterion can never be met.
    Aborted { reason: String },
}

impl Verdict {
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

// ── Observation ───────────────────────────────────────────────────

/// One instance's refreshed status for the current iteration.
///
/// `snapshot` is `None` when the status fetch failed. A failed fetch is
/// still a comparable observation: it fingerprints as the distinguished
/// unreachable snapshot, so repeated failures count as an unchanged
/// condition and a reachable/unreachable flip counts as a change.
#[derive(Debug, Clone)]
pub struct Observation {
    snapshot: Option<StatusSnapshot>,
    at: Instant,
}

impl Observation {
    pub fn new(snapshot: Option<StatusSnapshot>, at: Instant) -> Self {
        Self { snapshot, at }
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        self.snapshot.as_ref()
    }

    /// Whether the instance answered its status endpoint this iteration.
    pub fn reachable(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.reachable)
    }

    /// Structural fingerprint of the observed status.
    pub fn fingerprint(&self) -> u64 {
        match &self.snapshot {
            Some(snapshot) => snapshot.fingerprint(),
            None => StatusSnapshot::unreachable().fingerprint(),
        }
    }
}

// ── Check trait ───────────────────────────────────────────────────

/// A pluggable, independently configured convergence criterion,
/// evaluated once per polling iteration per active instance.
///
/// The runner combines verdicts per instance: aborted if any check
/// aborts, succeeded once every success-gating check succeeds, else
/// continue.
pub trait Check: Send {
    fn name(&self) -> &'static str;

    /// Evaluate this check for one instance given the current
    /// observation. Pure computation over the observation and this
    /// check's own progress state; never suspends.
    fn evaluate(&mut self, instance: &Instance, observation: &Observation) -> Verdict;

    /// Drop all progress state for an instance that has resolved.
    fn forget(&mut self, instance: &InstanceId);

    /// Whether this check's success is required for the instance to
    /// resolve. Safety bounds like [`TimeoutCheck`] return `false`:
    /// they can only abort, never hold up success.
    fn gates_success(&self) -> bool {
        true
    }
}

// ── Timeout ───────────────────────────────────────────────────────

/// Safety bound composed with other checks: aborts when the status has
/// been stuck unchanged for `state_time`, or when `constant_time` has
/// passed since this check started tracking the instance regardless of
/// changes (catches a status that oscillates forever and so keeps
/// resetting the state window). Never succeeds on its own.
pub struct TimeoutCheck {
    state_time: Duration,
    constant_time: Duration,
    progress: HashMap<InstanceId, Progress>,
}

impl TimeoutCheck {
    pub fn new(state_time: Duration, constant_time: Duration) -> Self {
        Self {
            state_time,
            constant_time,
            progress: HashMap::new(),
        }
    }
}

impl Check for TimeoutCheck {
    fn name(&self) -> &'static str {
        "timeout"
    }

    fn evaluate(&mut self, instance: &Instance, observation: &Observation) -> Verdict {
        let progress = self
            .progress
            .entry(instance.name.clone())
            .or_insert_with(|| Progress::begin(observation.at()));
        progress.tick(observation.at(), observation.fingerprint());

        if progress.state_elapsed() >= self.state_time {
            return Verdict::aborted(format!(
                "state timeout: status unchanged for {:?} (limit {:?})",
                progress.state_elapsed(),
                self.state_time
            ));
        }
        if progress.total_elapsed(observation.at()) >= self.constant_time {
            return Verdict::aborted(format!(
                "constant timeout: awaiting for {:?} (limit {:?})",
                progress.total_elapsed(observation.at()),
                self.constant_time
            ));
        }
        Verdict::Continue
    }

    fn forget(&mut self, instance: &InstanceId) {
        self.progress.remove(instance);
    }

    fn gates_success(&self) -> bool {
        false
    }
}

// ── Unavailable ───────────────────────────────────────────────────

/// Succeeds once the instance has been continuously unreachable for
/// `utilisation_time`. A single reachable observation resets the
/// window, so a dropped probe is never mistaken for a stopped
/// instance. A failed fetch counts as unreachable. Never aborts.
pub struct UnavailableCheck {
    utilisation_time: Duration,
    progress: HashMap<InstanceId, Progress>,
}

impl UnavailableCheck {
    pub fn new(utilisation_time: Duration) -> Self {
        Self {
            utilisation_time,
            progress: HashMap::new(),
        }
    }
}

impl Check for UnavailableCheck {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn evaluate(&mut self, instance: &Instance, observation: &Observation) -> Verdict {
        let progress = self
            .progress
            .entry(instance.name.clone())
            .or_insert_with(|| Progress::begin(observation.at()));
        let reachable = observation.reachable();
        progress.tick(observation.at(), reachable as u64);

        if !reachable && progress.state_elapsed() >= self.utilisation_time {
            Verdict::Succeeded
        } else {
            Verdict::Continue
        }
    }

    fn forget(&mut self, instance: &InstanceId) {
        self.progress.remove(instance);
    }
}

// ── Available ─────────────────────────────────────────────────────

/// Up-direction mirror of [`UnavailableCheck`]: succeeds once the
/// instance has been continuously reachable for `stable_time`. An
/// unreachable observation resets the window. Never aborts.
pub struct AvailableCheck {
    stable_time: Duration,
    progress: HashMap<InstanceId, Progress>,
}

impl AvailableCheck {
    pub fn new(stable_time: Duration) -> Self {
        Self {
            stable_time,
            progress: HashMap::new(),
        }
    }
}

impl Check for AvailableCheck {
    fn name(&self) -> &'static str {
        "available"
    }

    fn evaluate(&mut self, instance: &Instance, observation: &Observation) -> Verdict {
        let progress = self
            .progress
            .entry(instance.name.clone())
            .or_insert_with(|| Progress::begin(observation.at()));
        let reachable = observation.reachable();
        progress.tick(observation.at(), reachable as u64);

        if reachable && progress.state_elapsed() >= self.stable_time {
            Verdict::Succeeded
        } else {
            Verdict::Continue
        }
    }

    fn forget(&mut self, instance: &InstanceId) {
        self.progress.remove(instance);
    }
}

// ── Unchanged ─────────────────────────────────────────────────────

/// Succeeds once the status fingerprint has remained identical for
/// `await_time`. Any change of any observable field resets the window,
/// so success is never declared on a transient flicker of the right
/// status. Never aborts.
pub struct UnchangedCheck {
    await_time: Duration,
    progress: HashMap<InstanceId, Progress>,
}

impl UnchangedCheck {
    pub fn new(await_time: Duration) -> Self {
        Self {
            await_time,
            progress: HashMap::new(),
        }
    }
}

impl Check for UnchangedCheck {
    fn name(&self) -> &'static str {
        "unchanged"
    }

    fn evaluate(&mut self, instance: &Instance, observation: &Observation) -> Verdict {
        let progress = self
            .progress
            .entry(instance.name.clone())
            .or_insert_with(|| Progress::begin(observation.at()));
        progress.tick(observation.at(), observation.fingerprint());

        if progress.state_elapsed() >= self.await_time {
            Verdict::Succeeded
        } else {
            Verdict::Continue
        }
    }

    fn forget(&mut self, instance: &InstanceId) {
        self.progress.remove(instance);
    }
}
