//! zwave-migrate
//!
//! Renames Z-Wave JS entities onto the entity ids their OpenZWave
//! counterparts used, so automations and dashboards keep working after the
//! switch. Dry run unless `--commit` is given.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zwm_client::RegistryClient;
use zwm_config::{OverrideTable, RunMode, Settings, DEFAULT_REQUEST_TIMEOUT, DEFAULT_URL};
use zwm_engine::{render_override_table, Migrator, Outcome, RunReport, TracingReporter};

#[derive(Parser, Debug)]
#[command(name = "zwave-migrate")]
#[command(version, about = "Migrate Home Assistant entity ids from OpenZWave to Z-Wave JS", long_about = None)]
struct Cli {
    /// Home Assistant websocket endpoint, or its http(s) base URL
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Long-lived access token
    #[arg(long, env = "HA_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Apply the renames instead of only showing them
    #[arg(long)]
    commit: bool,

    /// Strip the migration suffix from OpenZWave entities again
    #[arg(long, conflicts_with_all = ["overrides", "copy_names"])]
    rollback: bool,

    /// YAML mapping of Z-Wave JS entity id to OpenZWave entity id
    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,

    /// Carry OpenZWave display names over to the renamed entities
    #[arg(long)]
    copy_names: bool,

    /// Seconds to wait for each registry response
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout: u64,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn mode(&self) -> RunMode {
        if self.rollback {
            RunMode::Rollback
        } else {
            RunMode::Migrate
        }
    }

    /// Resolve the run settings, loading the override file if given
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::new(&self.url, self.access_token.clone())?
            .with_mode(self.mode())
            .with_commit(self.commit)
            .with_copy_names(self.copy_names)
            .with_request_timeout(Duration::from_secs(self.timeout))?;

        if let Some(path) = &self.overrides {
            let overrides = OverrideTable::load(path)?;
            info!("Loaded {} overrides from {}", overrides.len(), path.display());
            settings = settings.with_overrides(overrides);
        }
        Ok(settings)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.access_token.as_deref().map_or(true, |t| t.trim().is_empty()) {
        eprintln!("No access token given; pass --access-token or set HA_ACCESS_TOKEN\n");
        let _ = Cli::command().print_help();
        process::exit(2);
    }

    let settings = cli.settings()?;

    let mut client = RegistryClient::connect(&settings.url, settings.request_timeout)
        .await
        .with_context(|| format!("connecting to {}", settings.url))?;
    client
        .authenticate(&settings.access_token)
        .await
        .context("authenticating with Home Assistant")?;
    info!("Connected to {}", settings.url);

    let migrator = Migrator::from_settings(&settings);
    let report = migrator.run(&mut client, &mut TracingReporter).await?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &RunReport) {
    if report.outcome == Outcome::NothingToMigrate {
        println!("Didn't find any Z-Wave JS nodes, nothing to migrate");
        return;
    }

    if report.has_unresolved() {
        println!("# Unresolved Z-Wave JS entities. Replace each \"??\" with the OpenZWave");
        println!("# entity id to take over and pass this file back with --overrides.");
        print!("{}", render_override_table(&report.plan));
    }

    for node_id in &report.nodes_without_renames {
        warn!("No entities renamed for Z-Wave JS node {}", node_id);
    }

    println!("{}", report.tally());
}
