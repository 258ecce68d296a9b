use std::path::Path;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "fleetgate",
    about = "fleetgate — await fleets of service instances into a target condition",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to the fleet definition file.
    #[arg(short, long, default_value = "fleet.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

/// Duration overrides shared by both await directions. Values use the
/// fleet.toml duration syntax: "500ms", "5s", "2m".
#[derive(Debug, clap::Args)]
struct AwaitArgs {
    /// Override the pause between polling iterations.
    #[arg(long)]
    delay: Option<String>,
    /// Override the max time without a status change before aborting.
    #[arg(long)]
    state_time: Option<String>,
    /// Override the max total time before aborting.
    #[arg(long)]
    constant_time: Option<String>,
    /// Override the fingerprint-stability window.
    #[arg(long)]
    await_time: Option<String>,
    /// Do not log still-awaiting instances every iteration.
    #[arg(long)]
    quiet: bool,
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Await all instances up and stable.
    AwaitUp {
        /// Override the continuous-reachable window.
        #[arg(long)]
        stable_time: Option<String>,

        #[command(flatten)]
        args: AwaitArgs,
    },
    /// Await all instances down.
    AwaitDown {
        /// Override the continuous-unreachable window.
        #[arg(long)]
        utilisation_time: Option<String>,

        #[command(flatten)]
        args: AwaitArgs,
    },
    /// Probe each instance once and print its status.
    Status {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

/// Default filter enabling info-level events from every fleetgate crate.
/// `RUST_LOG` directives still take precedence.
fn log_filter() -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for target in [
        "fleetgate_probe",
        "fleetgate_engine",
        "fleetgate_action",
        "fleetgate_cli",
    ] {
        filter = filter.add_directive(format!("{target}=info").parse()?);
    }
    Ok(filter)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()?).init();

    let cli = Cli::parse();
    let config = commands::load_config(Path::new(&cli.config))?;

    match cli.command {
        Commands::AwaitUp { stable_time, args } => {
            commands::await_up::run(&config, stable_time.as_deref(), &args).await
        }
        Commands::AwaitDown {
            utilisation_time,
            args,
        } => commands::await_down::run(&config, utilisation_time.as_deref(), &args).await,
        Commands::Status { format } => commands::status::run(&config, &format).await,
    }
}
