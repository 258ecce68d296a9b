//! CLI command implementations.

pub mod await_down;
pub mod await_up;
pub mod status;

use std::path::Path;
use std::time::Duration;

use anyhow::anyhow;
use tracing::info;

use fleetgate_core::{parse_duration, FleetConfig};
use fleetgate_engine::RunResult;
use fleetgate_probe::HttpStatusSource;

/// Load the fleet definition and log what was found.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<FleetConfig> {
    let config = FleetConfig::from_file(path)?;
    info!(
        path = %path.display(),
        instances = config.instances().len(),
        "loaded fleet definition"
    );
    Ok(config)
}

/// Build the probe from the `[probe]` table, with defaults.
pub(crate) fn source(config: &FleetConfig) -> anyhow::Result<HttpStatusSource> {
    let mut endpoint = "/status".to_string();
    let mut timeout = Duration::from_secs(2);
    if let Some(probe) = &config.probe {
        if let Some(e) = &probe.endpoint {
            endpoint = e.clone();
        }
        if let Some(raw) = &probe.timeout {
            timeout = parse_duration(raw)
                .ok_or_else(|| anyhow!("invalid probe timeout: {raw:?}"))?;
        }
    }
    Ok(HttpStatusSource::new(&endpoint, timeout))
}

/// Parse an optional duration flag, rejecting unparseable values.
pub(crate) fn flag_duration(name: &str, raw: Option<&str>) -> anyhow::Result<Option<Duration>> {
    match raw {
        None => Ok(None),
        Some(raw) => parse_duration(raw)
            .map(Some)
            .ok_or_else(|| anyhow!("invalid --{name} value: {raw:?}")),
    }
}

pub(crate) fn print_result(result: &RunResult, format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    for name in result.succeeded() {
        println!("✓ {name}");
    }
    println!(
        "{} instance(s) converged in {} iteration(s)",
        result.len(),
        result.iterations()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_duration_accepts_valid_values() {
        assert_eq!(
            flag_duration("delay", Some("5s")).unwrap(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(flag_duration("delay", None).unwrap(), None);
    }

    #[test]
    fn flag_duration_names_the_flag_in_errors() {
        let err = flag_duration("state-time", Some("soon")).unwrap_err();
        assert!(err.to_string().contains("--state-time"));
    }

    #[test]
    fn load_config_reads_fleet_definition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.toml");
        std::fs::write(
            &path,
            r#"
            [[instances]]
            name = "api"
            address = "127.0.0.1:8080"
            "#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.instances().len(), 1);
    }

    #[test]
    fn source_rejects_bad_probe_timeout() {
        let config: FleetConfig = toml::from_str(
            r#"
            [probe]
            timeout = "whenever"
            "#,
        )
        .unwrap();
        assert!(source(&config).is_err());
    }
}
