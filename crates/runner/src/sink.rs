//! Event emission
//!
//! The pipeline reports alerts, strategy changes and snapshots through an
//! [`EngineSink`]. Alerts reach it through the alert engine's own sink so
//! they are delivered at the moment they are raised.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::Serialize;
use swapflow_analytics::AnalyticsSnapshot;
use swapflow_core::{Alert, Strategy};
use swapflow_ports::AlertSink;
use tokio::sync::broadcast;

/// Receives everything the pipeline emits
pub trait EngineSink: Send + Sync {
    fn on_alert(&self, alert: &Alert);

    /// A strategy was created (`is_new`) or gained legs
    fn on_strategy(&self, _strategy: &Strategy, _is_new: bool) {}

    fn on_snapshot(&self, _snapshot: &AnalyticsSnapshot) {}
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EngineSink for NullSink {
    fn on_alert(&self, _alert: &Alert) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum EngineEvent {
    Alert(Alert),
    #[serde(rename_all = "camelCase")]
    Strategy { strategy: Strategy, is_new: bool },
    Snapshot(Box<AnalyticsSnapshot>),
}

/// Fans events out to any number of subscribers
pub struct BroadcastSink {
    tx: broadcast::Sender<EngineEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    fn send(&self, event: EngineEvent) {
        // No subscribers is ok
        if self.tx.send(event).is_err() {
            debug!("Engine event dropped: no subscribers");
        }
    }
}

impl EngineSink for BroadcastSink {
    fn on_alert(&self, alert: &Alert) {
        self.send(EngineEvent::Alert(alert.clone()));
    }

    fn on_strategy(&self, strategy: &Strategy, is_new: bool) {
        self.send(EngineEvent::Strategy {
            strategy: strategy.clone(),
            is_new,
        });
    }

    fn on_snapshot(&self, snapshot: &AnalyticsSnapshot) {
        self.send(EngineEvent::Snapshot(Box::new(snapshot.clone())));
    }
}

/// Records events in memory
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Alert(alert) => Some(alert.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn strategies(&self) -> Vec<(Strategy, bool)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Strategy { strategy, is_new } => Some((strategy.clone(), *is_new)),
                _ => None,
            })
            .collect()
    }

    pub fn snapshot_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, EngineEvent::Snapshot(_)))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EngineSink for CollectingSink {
    fn on_alert(&self, alert: &Alert) {
        self.events.lock().push(EngineEvent::Alert(alert.clone()));
    }

    fn on_strategy(&self, strategy: &Strategy, is_new: bool) {
        self.events.lock().push(EngineEvent::Strategy {
            strategy: strategy.clone(),
            is_new,
        });
    }

    fn on_snapshot(&self, snapshot: &AnalyticsSnapshot) {
        self.events
            .lock()
            .push(EngineEvent::Snapshot(Box::new(snapshot.clone())));
    }
}

/// Routes alert engine emissions into an [`EngineSink`]
pub struct AlertForwarder {
    sink: Arc<dyn EngineSink>,
}

impl AlertForwarder {
    pub fn new(sink: Arc<dyn EngineSink>) -> Self {
        Self { sink }
    }
}

impl AlertSink for AlertForwarder {
    fn on_alert(&self, alert: &Alert) {
        self.sink.on_alert(alert);
    }
}
