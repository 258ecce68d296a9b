//! fleet.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::Instance;

/// Root of a fleet.toml file.
///
/// ```toml
/// [[instances]]
/// name = "author"
/// address = "127.0.0.1:4502"
///
/// [probe]
/// endpoint = "/status"
/// timeout = "2s"
///
/// [await.down]
/// delay = "1s"
/// utilisation_time = "10s"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
    pub probe: Option<ProbeConfig>,
    pub r#await: Option<AwaitConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub endpoint: Option<String>,
    pub timeout: Option<String>,
}

/// Per-direction await settings, both optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AwaitConfig {
    pub up: Option<AwaitSettings>,
    pub down: Option<AwaitSettings>,
}

/// Named settings for one await direction. Every field overrides a
/// built-in default; unset fields fall through.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AwaitSettings {
    /// Pause between polling iterations, e.g. "1s".
    pub delay: Option<String>,
    /// Max time without a state change before aborting, e.g. "2m".
    pub state_time: Option<String>,
    /// Max total time before aborting, e.g. "10m".
    pub constant_time: Option<String>,
    /// Continuous-unreachable window required by the down direction.
    pub utilisation_time: Option<String>,
    /// Continuous-reachable window required by the up direction.
    pub stable_time: Option<String>,
    /// Fingerprint-stability window, e.g. "3s".
    pub await_time: Option<String>,
    /// Log every state transition at info level.
    pub verbose: Option<bool>,
}

impl FleetConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FleetConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// The configured instances as domain values.
    pub fn instances(&self) -> Vec<Instance> {
        self.instances
            .iter()
            .map(|i| Instance::new(&i.name, &i.address))
            .collect()
    }

    /// Settings for the down direction, if any.
    pub fn await_down(&self) -> Option<&AwaitSettings> {
        self.r#await.as_ref().and_then(|a| a.down.as_ref())
    }

    /// Settings for the up direction, if any.
    pub fn await_up(&self) -> Option<&AwaitSettings> {
        self.r#await.as_ref().and_then(|a| a.up.as_ref())
    }
}
