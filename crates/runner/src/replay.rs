//! JSON file replay source

use std::path::{Path, PathBuf};

use log::info;
use swapflow_ports::{PortError, PortResult, ReplayData, ReplaySource};

/// Loads `{ "trades": [...], "strategies": [...] }` from disk
#[derive(Debug, Clone)]
pub struct FileReplay {
    path: PathBuf,
}

impl FileReplay {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `data` to the file, replacing its contents
    pub fn save(&self, data: &ReplayData) -> PortResult<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| PortError::ReplayMalformed(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| {
            PortError::ReplayUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

impl ReplaySource for FileReplay {
    fn load_replay(&self) -> PortResult<ReplayData> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            PortError::ReplayUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let data: ReplayData = serde_json::from_str(&content)
            .map_err(|e| PortError::ReplayMalformed(e.to_string()))?;

        info!(
            "Loaded replay from {}: {} trades, {} strategies",
            self.path.display(),
            data.trades.len(),
            data.strategies.len()
        );
        Ok(data)
    }
}
