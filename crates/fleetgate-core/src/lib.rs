//! fleetgate-core — instance model and configuration for fleetgate.
//!
//! Provides the domain types shared by every fleetgate crate: the
//! [`Instance`] identity, the [`StatusSnapshot`] observed from a running
//! instance, the [`StatusSource`] fetch contract, and the `fleet.toml`
//! configuration with its await-time settings.
//!
//! All duration settings are strings like `"500ms"`, `"5s"`, `"2m"`,
//! parsed by [`duration::parse_duration`].

pub mod config;
pub mod duration;
pub mod source;
pub mod types;

pub use config::{AwaitSettings, FleetConfig, InstanceConfig, ProbeConfig};
pub use duration::parse_duration;
pub use source::{FetchError, StatusSource};
pub use types::{Instance, InstanceId, StatusSnapshot};
