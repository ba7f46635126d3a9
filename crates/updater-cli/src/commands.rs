use std::collections::BTreeMap;
use std::time::SystemTime;

use anyhow::Context;
use colored::Colorize;
use tracing::info;
use updater_daemon::{ObjectUpdater, UpdaterConfig};
use updater_ring::{FileRing, RingResolver, RingSource};
use updater_store::PendingStore;
use updater_types::{ObjectPath, UpdateRecord};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli { command, format, .. } = cli;
    match command {
        Command::Once(args) => cmd_once(args, format).await,
        Command::Forever(args) => cmd_forever(args).await,
        Command::Enqueue(args) => cmd_enqueue(args, format),
        Command::Ring(args) => cmd_ring(args, format),
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(args: &SweepArgs) -> anyhow::Result<UpdaterConfig> {
    let mut config = match &args.config {
        Some(path) => UpdaterConfig::load(path)?,
        None => UpdaterConfig::default(),
    };
    if let Some(devices) = &args.devices {
        config.devices = devices.clone();
    }
    if let Some(ring_path) = &args.ring_path {
        config.ring_path = ring_path.clone();
    }
    if args.no_mount_check {
        config.mount_check = false;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(interval) = args.interval {
        config.interval_secs = interval;
    }
    if let Some(slowdown) = args.slowdown {
        config.slowdown_secs = slowdown;
    }
    config.validate()?;
    Ok(config)
}

async fn cmd_once(args: SweepArgs, format: OutputFormat) -> anyhow::Result<()> {
    let updater = ObjectUpdater::from_config(load_config(&args)?)?;
    let stats = updater.run_once().await?;
    match format {
        OutputFormat::Text => {
            let mark = if stats.failures == 0 { "✓".green().bold() } else { "!".yellow().bold() };
            println!("{} Sweep finished in {:.02}s", mark, stats.elapsed.as_secs_f64());
            println!("  Successes: {}", stats.successes.to_string().green());
            println!("  Failures: {}", stats.failures.to_string().red());
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "successes": stats.successes,
                "failures": stats.failures,
                "elapsed_secs": stats.elapsed.as_secs_f64(),
            })
        ),
    }
    Ok(())
}

async fn cmd_forever(args: SweepArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    info!(
        devices = %config.devices.display(),
        concurrency = config.concurrency,
        interval_secs = config.interval_secs,
        "Starting object updater"
    );
    let updater = ObjectUpdater::from_config(config)?;
    tokio::select! {
        _ = updater.run_forever() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("waiting for shutdown signal")?;
            info!("Object updater stopping");
        }
    }
    Ok(())
}

fn cmd_enqueue(args: EnqueueArgs, format: OutputFormat) -> anyhow::Result<()> {
    let headers: BTreeMap<String, String> = args.headers.into_iter().collect();
    let path = ObjectPath::new(args.account, args.container, args.object);
    let record = UpdateRecord::new(path, args.op, headers);
    record.validate()?;

    let store = PendingStore::new(&args.device_path);
    let written = store
        .persist(&record, SystemTime::now())
        .with_context(|| format!("writing record on {}", args.device_path.display()))?;
    match format {
        OutputFormat::Text => {
            println!("{} Queued {} {}", "✓".green().bold(), record.op.to_string().cyan(), record.object_path().to_string().bold());
            println!("  Record: {}", written.display());
        }
        OutputFormat::Json => println!("{}", serde_json::json!({ "record": written })),
    }
    Ok(())
}

fn cmd_ring(args: RingArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ring = FileRing::new(&args.ring_path).reload()?;
    let placement = ring.get_nodes(&args.account, &args.container)?;
    match format {
        OutputFormat::Text => {
            println!(
                "/{}/{} -> partition {}",
                args.account,
                args.container,
                placement.partition.to_string().yellow().bold()
            );
            for node in &placement.nodes {
                println!("  {} {}", format!("#{}", node.id).dimmed(), node);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&placement)?),
    }
    Ok(())
}
