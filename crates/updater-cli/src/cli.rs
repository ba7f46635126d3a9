use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use updater_types::Operation;

#[derive(Parser)]
#[command(
    name = "object-updater",
    about = "Deliver pending container updates to every container replica",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sweep every device one time, one device after another
    Once(SweepArgs),
    /// Sweep all devices every interval until stopped
    Forever(SweepArgs),
    /// Write a pending update record onto a device
    Enqueue(EnqueueArgs),
    /// Show the container replicas for an account and container
    Ring(RingArgs),
}

/// Settings shared by `once` and `forever`. Flags override the config file.
#[derive(Args, Debug, Default)]
pub struct SweepArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub devices: Option<PathBuf>,
    #[arg(long)]
    pub ring_path: Option<PathBuf>,
    #[arg(long)]
    pub no_mount_check: bool,
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Seconds between sweep starts
    #[arg(long)]
    pub interval: Option<u64>,
    /// Seconds to pause after each record
    #[arg(long)]
    pub slowdown: Option<f64>,
}

#[derive(Args)]
pub struct EnqueueArgs {
    /// Device directory, e.g. /srv/node/sdb1
    #[arg(long)]
    pub device_path: PathBuf,
    #[arg(long)]
    pub account: String,
    #[arg(long)]
    pub container: String,
    #[arg(long)]
    pub object: String,
    #[arg(long, default_value = "put")]
    pub op: Operation,
    /// Header to forward, as `Name: value`
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

#[derive(Args)]
pub struct RingArgs {
    #[arg(long, default_value = "/etc/object-updater/container.ring.json")]
    pub ring_path: PathBuf,
    #[arg(long)]
    pub account: String,
    #[arg(long)]
    pub container: String,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
