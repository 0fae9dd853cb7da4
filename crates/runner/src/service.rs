//! Async driver
//!
//! A single task owns the [`Pipeline`] and pulls batches from a
//! [`TradeFeed`], so ticks never overlap.

use log::{info, warn};
use tokio::sync::watch;

use crate::feed::TradeFeed;
use crate::pipeline::Pipeline;

/// Totals reported when the runner stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Batches pulled from the feed
    pub batches: u64,
    /// Batches that admitted at least one trade
    pub ticks: u64,
    pub new_trades: u64,
    pub alerts: u64,
}

/// Drives a pipeline from a feed until the feed ends or shutdown is signalled
pub struct PipelineRunner {
    pipeline: Pipeline,
}

impl PipelineRunner {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> Pipeline {
        self.pipeline
    }

    /// Run until the feed is exhausted or `shutdown` turns true
    pub async fn run<F>(&mut self, mut feed: F, mut shutdown: watch::Receiver<bool>) -> RunReport
    where
        F: TradeFeed,
    {
        info!("Pipeline runner started");
        let mut report = RunReport::default();

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                // Shutdown signal
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        warn!("Shutdown sender dropped, stopping runner");
                    }
                    break;
                }

                // Next batch from the feed
                batch = feed.next_batch() => {
                    match batch {
                        Some(batch) => {
                            report.batches += 1;
                            let outcome = self.pipeline.process_tick(batch);
                            if !outcome.is_empty() {
                                report.ticks += 1;
                                report.new_trades += outcome.new_trades.len() as u64;
                                report.alerts += outcome.alerts.len() as u64;
                            }
                        }
                        None => {
                            info!("Trade feed exhausted");
                            break;
                        }
                    }
                }
            }
        }

        info!(
            "Pipeline runner stopped after {} batches ({} ticks, {} trades, {} alerts)",
            report.batches, report.ticks, report.new_trades, report.alerts
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::feed::{FeedBatch, SyntheticFeed, SyntheticFeedConfig, VecFeed};
    use crate::rates::RateTable;
    use crate::sink::NullSink;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use swapflow_clock::ManualClock;
    use swapflow_core::{Trade, TradeAction};
    use swapflow_ports::Clock;

    fn runner(clock: Arc<ManualClock>) -> PipelineRunner {
        let pipeline = Pipeline::new(
            &EngineConfig::default(),
            clock,
            Arc::new(RateTable::new()),
            Arc::new(NullSink),
        );
        PipelineRunner::new(pipeline)
    }

    #[tokio::test]
    async fn test_runs_until_feed_exhausted() {
        let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap());
        let trade = Trade::new("T1", TradeAction::New, clock.now(), "EUR-ESTR")
            .with_leg1(dec!(50_000_000), "EUR")
            .with_tenor("2Y");
        let batch = FeedBatch::from_trades(vec![trade]);
        let feed = VecFeed::new(vec![batch.clone(), batch, FeedBatch::default()]);

        let (_tx, rx) = watch::channel(false);
        let mut runner = runner(clock);
        let report = runner.run(feed, rx).await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.ticks, 1);
        assert_eq!(report.new_trades, 1);
        assert_eq!(runner.pipeline().ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap());
        let config = SyntheticFeedConfig {
            interval: Some(std::time::Duration::from_millis(5)),
            ..Default::default()
        };
        let feed = SyntheticFeed::with_seed(config, clock.clone(), 42);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut runner = runner(clock);
            runner.run(feed, rx).await
        });

        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
        tx.send(true).unwrap();

        let report = handle.await.unwrap();
        assert!(report.batches >= 1);
    }

    #[tokio::test]
    async fn test_already_shut_down() {
        let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap());
        let feed = VecFeed::new(vec![FeedBatch::default()]);
        let (_tx, rx) = watch::channel(true);

        let report = runner(clock).run(feed, rx).await;
        assert_eq!(report, RunReport::default());
    }
}
