//! Cooperative daemon: entry point for configuring and bootstrapping a cooperative.

use anyhow::Context;
use cbank_node::{bootstrap, init_logging, CoopConfig, LogFormat};
use cbank_types::{Address, GovernorSettings, SystemClock};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cbank-daemon", about = "Member-governed lending cooperative")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "CBANK_CONFIG")]
    config: Option<PathBuf>,

    /// Genesis members (comma-separated: "cb_alice,cb_bob").
    #[arg(long, env = "CBANK_GENESIS_MEMBERS", value_delimiter = ',')]
    genesis_members: Vec<String>,

    /// Base asset minted to the pool at bootstrap.
    #[arg(long, env = "CBANK_INITIAL_RESERVES")]
    initial_reserves: Option<u64>,

    /// Use fast governance timelines for local test deployments.
    #[arg(long, env = "CBANK_TESTNET")]
    testnet: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CBANK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "CBANK_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the effective configuration as TOML.
    Config,
    /// Bootstrap a cooperative and print its summary as JSON.
    Bootstrap {
        /// Also print every bootstrap event as a JSON line.
        #[arg(long)]
        events: bool,
    },
}

fn effective_config(cli: &Cli) -> anyhow::Result<CoopConfig> {
    let mut config = match &cli.config {
        Some(path) => CoopConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CoopConfig::default(),
    };
    if !cli.genesis_members.is_empty() {
        config.genesis_members = cli
            .genesis_members
            .iter()
            .map(|raw| Address::parse(raw).with_context(|| format!("genesis member {raw:?}")))
            .collect::<anyhow::Result<_>>()?;
    }
    if let Some(reserves) = cli.initial_reserves {
        config.initial_reserves = reserves;
    }
    if cli.testnet {
        config.governor = GovernorSettings::testnet_defaults();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Bootstrap { events } => {
            config.validate()?;
            let mut coop = bootstrap(&config, SystemClock).context("bootstrapping cooperative")?;
            if events {
                coop.subscribe(Box::new(|event| match event.to_json() {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!("failed to encode event: {e}"),
                }));
            }
            coop.flush_events();
            let summary = serde_json::to_string_pretty(&coop.summary())?;
            println!("{summary}");
            tracing::info!(
                members = config.genesis_members.len(),
                governor = %config.governor_address,
                "cooperative ready"
            );
        }
    }

    Ok(())
}
