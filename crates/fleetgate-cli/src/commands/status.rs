use fleetgate_core::{FleetConfig, StatusSource};

pub async fn run(config: &FleetConfig, format: &str) -> anyhow::Result<()> {
    let source = super::source(config)?;
    let mut report = serde_json::Map::new();

    for instance in config.instances() {
        match source.fetch(&instance).await {
            Ok(snapshot) => {
                if format == "json" {
                    report.insert(instance.name.clone(), serde_json::to_value(&snapshot)?);
                } else {
                    let components = snapshot
                        .components
                        .iter()
                        .map(|(name, up)| format!("{name}={up}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    if components.is_empty() {
                        println!("{instance}: {}", snapshot.state);
                    } else {
                        println!("{instance}: {} [{components}]", snapshot.state);
                    }
                }
            }
            Err(e) => {
                if format == "json" {
                    report.insert(
                        instance.name.clone(),
                        serde_json::json!({ "reachable": false, "error": e.to_string() }),
                    );
                } else {
                    println!("{instance}: unreachable ({e})");
                }
            }
        }
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
