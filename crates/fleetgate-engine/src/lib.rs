//! fleetgate-engine — the convergence engine.
//!
//! Repeatedly polls a set of instances and decides, under network
//! flakiness, whether each has reached a desired operational condition.
//!
//! # Architecture
//!
//! ```text
//! CheckRunner
//!   ├── per iteration: fetch status per active instance (StatusSource)
//!   ├── evaluate every Check in fixed order → combined Verdict
//!   │   ├── TimeoutCheck     (safety bound, can only abort)
//!   │   ├── UnavailableCheck (continuous-unreachable window)
//!   │   ├── AvailableCheck   (continuous-reachable window)
//!   │   └── UnchangedCheck   (fingerprint-stability window)
//!   ├── resolved instances leave the active set → RunResult
//!   └── sleep(delay) while any instance remains active
//! ```
//!
//! Each check owns a [`Progress`] entry per instance it has observed:
//! accumulated state window, total elapsed time, and the last seen
//! fingerprint. Nothing else reads or writes that state.
//!
//! An aborted instance is an expected outcome, recorded in the
//! [`RunResult`] with its reason; the runner returns an error only for
//! configuration mistakes detected before the loop starts.

pub mod check;
pub mod progress;
pub mod runner;

pub use check::{
    AvailableCheck, Check, Observation, TimeoutCheck, UnavailableCheck, UnchangedCheck, Verdict,
};
pub use progress::Progress;
pub use runner::{CheckRunner, EngineError, Outcome, RunResult};
