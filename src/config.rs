use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{GRID_SNAP_INTERVAL, HISTORY_LIMIT, SNAP_THRESHOLD_PX};
use crate::paths::config_path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub history: HistoryConfig,
    pub snap: SnapConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    pub enabled: bool,
    pub threshold_px: f64,
    pub grid_interval: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    pub auto_save: bool,
    pub create_backup_on_save: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: HISTORY_LIMIT,
        }
    }
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_px: SNAP_THRESHOLD_PX,
            grid_interval: GRID_SNAP_INTERVAL,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            auto_save: false,
            create_backup_on_save: true,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                if let Ok(config) = serde_json::from_str(&contents) {
                    return config;
                }
                log::warn!("config at {} is unreadable, using defaults", path.display());
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.history.max_entries, HISTORY_LIMIT);
        assert_eq!(config.snap.threshold_px, SNAP_THRESHOLD_PX);
        assert!(config.snap.enabled);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.history.max_entries, config.history.max_entries);
        assert_eq!(back.snap.grid_interval, config.snap.grid_interval);
    }
}
