use std::time::Duration;

use agrosense::{
    MonitoringScheduler, RecommendationEngine,
    config::{Config, read_config_file},
    util::{get_config_path, get_interval},
};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (falls back to AGROSENSE_CONFIG, then the demo units)
    #[arg(short)]
    file: Option<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration: Option<u64>,

    /// Log level for the monitoring engine
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn init(level: LevelFilter) {
    let filter = filter::Targets::new().with_targets(vec![
        ("agrosense", level),
        ("agrosense_hub", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.log_level);
    trace!("started with args: {args:?}");

    let config = match args.file.clone().or_else(get_config_path) {
        Some(path) => read_config_file(&path).with_context(|| format!("loading {path}"))?,
        None => {
            debug!("no config file given, using the demo units");
            Config::default()
        }
    };

    let interval = config.interval().context("invalid configuration")?;
    let scheduler = MonitoringScheduler::with_interval(get_interval(interval));
    for unit in config.build_units().context("invalid unit configuration")? {
        scheduler.register(unit.shared());
    }

    scheduler.start().context("starting the scheduler")?;
    info!("monitoring {} units", scheduler.unit_count());

    match args.duration {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    debug!("run duration elapsed");
                }
                res = tokio::signal::ctrl_c() => {
                    res.context("waiting for Ctrl-C")?;
                }
            }
        }
        None => tokio::signal::ctrl_c()
            .await
            .context("waiting for Ctrl-C")?,
    }

    scheduler.stop();
    report(&scheduler);

    Ok(())
}

fn report(scheduler: &MonitoringScheduler) {
    let engine = RecommendationEngine::new();

    println!("{}", scheduler.stats());
    for (status, count) in scheduler.status_counts() {
        println!("{status}: {count}");
    }
    println!();

    let alerts = scheduler.alerts();
    if !alerts.is_empty() {
        println!("Alerts ({}):", alerts.len());
        for alert in &alerts {
            println!("  {}", alert.summary_line());
        }
        println!();
    }

    for unit in scheduler.units() {
        match unit.lock() {
            Ok(unit) => {
                println!("{}", unit.summary());
                println!("{}", engine.action_plan(&unit));
            }
            Err(_) => warn!("skipping a unit left unavailable by a failed poll"),
        }
    }
}
