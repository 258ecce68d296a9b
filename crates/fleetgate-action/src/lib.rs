//! fleetgate-action — caller-facing await actions.
//!
//! An action selects which checks participate, resolves every duration
//! with a documented precedence (explicit per-call option > fleet.toml
//! setting > built-in default), runs the [`CheckRunner`], and converts
//! the [`RunResult`] into a reportable outcome: an empty instance set
//! is a logged no-op, and any aborted instance turns into a single
//! aggregated [`ActionError::Aborted`] naming every failure while the
//! succeeded instances are still reported.
//!
//! [`CheckRunner`]: fleetgate_engine::CheckRunner
//! [`RunResult`]: fleetgate_engine::RunResult

pub mod actions;
pub mod options;

pub use actions::{ActionError, AwaitDownAction, AwaitUpAction};
pub use options::{AwaitDownOptions, AwaitUpOptions};
