use serde::{Deserialize, Serialize};
use swapflow_core::{Strategy, Trade};

use crate::PortResult;

/// Persisted trades and strategies used to warm a pipeline on startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default)]
    pub strategies: Vec<Strategy>,
}

impl ReplayData {
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty() && self.strategies.is_empty()
    }
}

/// Port for loading previously processed state
pub trait ReplaySource {
    fn load_replay(&self) -> PortResult<ReplayData>;
}
