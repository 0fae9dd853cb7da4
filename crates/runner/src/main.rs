use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use swapflow_clock::SystemClock;
use swapflow_core::format_notional;
use swapflow_ports::{PortError, ReplaySource};
use swapflow_runner::{
    BroadcastSink, EngineConfig, EngineEvent, FileReplay, Pipeline, PipelineRunner, RateTable,
    RunnerError, SyntheticFeed, SyntheticFeedConfig,
};
use tokio::sync::{broadcast, watch};

fn print_help() {
    eprintln!(
        r#"Swapflow - real-time swap trade stream engine

USAGE:
    swapflow [OPTIONS]

OPTIONS:
    --config <PATH>     Load engine configuration from JSON file
    --replay <PATH>     Seed from a replay file and write state back on exit
    --ticks <N>         Stop after N synthetic batches (default: run until Ctrl-C)
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run with defaults
    swapflow

    # Run 50 ticks against a config and a replay file
    swapflow --config engine.json --replay state.json --ticks 50
"#
    );
}

/// Logs every engine event until the channel closes
async fn log_events(mut rx: broadcast::Receiver<EngineEvent>) {
    loop {
        match rx.recv().await {
            Ok(EngineEvent::Alert(alert)) => {
                info!("ALERT [{:?}] {}", alert.severity, alert.message);
            }
            Ok(EngineEvent::Strategy { strategy, is_new }) => {
                if is_new {
                    info!(
                        "Strategy {} {} on {} ({} legs, {} EUR)",
                        strategy.id,
                        strategy.label,
                        strategy.underlying,
                        strategy.leg_count(),
                        format_notional(strategy.total_notional_eur)
                    );
                }
            }
            Ok(EngineEvent::Snapshot(snapshot)) => {
                let hhi = snapshot
                    .risk
                    .as_ref()
                    .map(|r| r.concentration_hhi.round_dp(0).to_string())
                    .unwrap_or_else(|| "-".to_string());
                let volume_5m = snapshot
                    .realtime
                    .as_ref()
                    .map(|r| format_notional(r.volume_5m))
                    .unwrap_or_else(|| "-".to_string());
                info!(
                    "Snapshot: {} trades, {} EUR, 5m volume {}, HHI {}",
                    snapshot.trade_count,
                    format_notional(snapshot.total_notional_eur),
                    volume_5m,
                    hhi
                );
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Event logger lagged {} events", n);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut replay_path: Option<String> = None;
    let mut ticks: Option<usize> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            "--replay" | "-r" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --replay requires a path argument");
                    std::process::exit(1);
                }
                replay_path = Some(args[i].clone());
            }
            "--ticks" | "-n" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(n) => ticks = Some(n),
                    None => {
                        eprintln!("Error: --ticks requires a positive integer");
                        std::process::exit(1);
                    }
                }
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match &config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            EngineConfig::from_file(path).map_err(RunnerError::from)?
        }
        None => {
            info!("Using default configuration");
            EngineConfig::default()
        }
    };

    let rates = Arc::new(RateTable::from_eur_quotes(config.eur_quotes.clone()));
    info!("Rate table: {} currencies besides EUR", rates.len());

    let clock = Arc::new(SystemClock::new());
    let sink = Arc::new(BroadcastSink::new(1024));
    let logger = tokio::spawn(log_events(sink.subscribe()));

    let mut pipeline = Pipeline::new(&config, clock.clone(), rates, sink.clone());

    let replay = replay_path.as_ref().map(FileReplay::new);
    if let Some(replay) = &replay {
        match replay.load_replay() {
            Ok(data) => pipeline.seed(data),
            Err(PortError::ReplayUnavailable(reason)) => {
                warn!("No replay loaded ({}), starting empty", reason);
            }
            Err(e) => return Err(RunnerError::from(e).into()),
        }
    }

    let feed_config = SyntheticFeedConfig {
        batches: ticks,
        interval: Some(Duration::from_secs(1)),
        ..Default::default()
    };
    let feed = SyntheticFeed::new(feed_config, clock);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    info!("Starting swapflow pipeline");
    let handle = tokio::spawn(async move {
        let mut runner = PipelineRunner::new(pipeline);
        let report = runner.run(feed, shutdown_rx).await;
        (report, runner.into_pipeline())
    });
    let (report, pipeline) = handle
        .await
        .map_err(|e| RunnerError::Task(e.to_string()))?;

    let summary = pipeline.session().summary(chrono::Utc::now());
    info!(
        "Session: {} trades, {} EUR, {} strategies, {} alerts raised",
        summary.total_trades,
        format_notional(summary.total_notional_eur),
        summary.strategy_count,
        report.alerts
    );

    if let Some(replay) = &replay {
        replay
            .save(&pipeline.replay_data())
            .map_err(RunnerError::from)?;
        info!("State written to {}", replay.path().display());
    }

    // Closing the last sender ends the logger
    drop(pipeline);
    drop(sink);
    let _ = logger.await;

    Ok(())
}
