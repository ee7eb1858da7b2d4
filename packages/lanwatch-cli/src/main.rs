//! lanwatch CLI - WiFi client-list monitor for home routers
//!
//! This binary polls a router's web interface for its connected-client
//! list and can:
//! - Print the current client list
//! - Run a single change-detection cycle
//! - Watch continuously and notify when devices join

mod daemon;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use lanwatch_core::config::{self, AppConfig};
use lanwatch_core::notify::{LogNotifier, Notifier, WebhookNotifier};
use lanwatch_core::router::{DeviceSource, RouterClient};
use lanwatch_core::{CycleReport, Error, Monitor, parser};

#[derive(Parser)]
#[command(name = "lanwatch")]
#[command(version)]
#[command(about = "Watch a router's client list and notify on new devices")]
#[command(long_about = "
lanwatch polls a home router's web interface for its connected-client
list, works out who is on the network, and reports devices as they
join.

Quick start:
  1. Write a config:     lanwatch config
  2. List clients once:  lanwatch poll
  3. Watch continuously: lanwatch watch

For systemd integration, see: lanwatch watch --help
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Path to the config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and print the current client list
    #[command(alias = "list")]
    Poll,

    /// Run one change-detection cycle and report new devices
    Check,

    /// Watch continuously and notify when devices join
    #[command(alias = "daemon")]
    Watch {
        /// Poll interval in seconds (overrides the config file)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show configuration paths and an example config
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("lanwatch={log_level},lanwatch_core={log_level}").into()
            }),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Poll => cmd_poll(&cli).await,
        Commands::Check => cmd_check(&cli).await,
        Commands::Watch { interval } => daemon::run(&cli, interval).await,
        Commands::Config => cmd_config(&cli),
    }
}

/// Load the config, preferring the `--config` path when given.
pub(crate) fn load_config(cli: &Cli) -> Result<AppConfig> {
    match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => Ok(config),
        Err(e @ Error::ConfigMissing { .. }) => {
            bail!("{e}\n\nRun 'lanwatch config' to see an example config file.")
        }
        Err(e) => Err(e.into()),
    }
}

/// Wire a monitor up from the config: router session plus whichever
/// notifier is configured.
pub(crate) fn build_monitor(config: &AppConfig) -> Result<Monitor> {
    let router = RouterClient::new(
        &config.router.host,
        &config.router.username,
        &config.router.password,
    )?;

    let notifier: Box<dyn Notifier> = match config.notify.webhook_url.as_deref() {
        Some(url) => Box::new(WebhookNotifier::new(url)?),
        None => Box::new(LogNotifier),
    };

    Ok(Monitor::new(
        Box::new(router),
        notifier,
        &config.monitor.monitored_devices,
    ))
}

async fn cmd_poll(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let mut router = RouterClient::new(
        &config.router.host,
        &config.router.username,
        &config.router.password,
    )?;

    if !router.login().await? {
        bail!(Error::LoginRejected);
    }

    let body = router.fetch_clients().await?;
    let devices = parser::parse(&body);

    match cli.format {
        OutputFormat::Text => {
            println!("Found {} clients:", devices.len());
            println!();
            for device in &devices {
                let ip = device.ip.as_deref().unwrap_or("-");
                let hostname = device.hostname.as_deref().unwrap_or("-");
                let vendor = device.vendor.as_deref().unwrap_or("");

                if vendor.is_empty() {
                    println!("  {:17} {:15} {}", device.mac, ip, hostname);
                } else {
                    println!("  {:17} {:15} {} ({})", device.mac, ip, hostname, vendor);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&devices)?);
        }
    }

    Ok(())
}

async fn cmd_check(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let mut monitor = build_monitor(&config)?;

    let report = monitor.run_single().await?;
    print_report(cli, &report)?;

    Ok(())
}

fn print_report(cli: &Cli, report: &CycleReport) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            println!("{} clients connected", report.devices.len());
            if report.joined.is_empty() {
                println!("No new devices.");
            } else {
                println!("{} new devices:", report.joined.len());
                for device in &report.joined {
                    let vendor = device.vendor.as_deref().unwrap_or("-");
                    println!("  {:17} ({})", device.mac, vendor);
                }
            }
            if report.departed > 0 {
                println!("{} devices disconnected", report.departed);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "devices": report.devices,
                    "joined": report.joined,
                    "notified": report.notified,
                    "departed": report.departed,
                })
            );
        }
    }
    Ok(())
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration");
            println!("=============");
            println!();
            println!("Config file: {}", config_path.display());
            println!();
            println!("Example config.toml:");
            println!();
            println!("{}", config::generate_example_config());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "config_file": config_path.display().to_string(),
                    "example": config::generate_example_config(),
                })
            );
        }
    }

    Ok(())
}
