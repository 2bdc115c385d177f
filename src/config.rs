//! Engine configuration persisted as JSON in the user's config directory.

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{
    select_current_intent_by_pending_bolts, select_current_intent_default, ComputeConfig,
    IntentSelectionStrategy, SnapshotLimits, StoreOptions,
};

const APP_NAME: &str = "specboard";
const CONFIG_FILE: &str = "config.json";

/// How the store picks the intent shown in the focus card.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IntentSelection {
    /// Intent of the latest active bolt, else the first unblocked queued bolt.
    #[default]
    Default,
    /// Intent with the most pending bolts.
    ByPendingCount,
}

impl IntentSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ByPendingCount => "by-pending-count",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "default" => Some(Self::Default),
            "by-pending-count" => Some(Self::ByPendingCount),
            _ => None,
        }
    }

    pub fn strategy(&self) -> IntentSelectionStrategy {
        match self {
            Self::Default => select_current_intent_default,
            Self::ByPendingCount => select_current_intent_by_pending_bolts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recompute derived state after every mutation.
    pub auto_recompute: bool,
    pub intent_selection: IntentSelection,
    /// Bolts shown in the up-next queue.
    pub up_next_limit: usize,
    /// Events shown in the activity feed.
    pub activity_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let limits = SnapshotLimits::default();
        Self {
            auto_recompute: true,
            intent_selection: IntentSelection::Default,
            up_next_limit: limits.up_next,
            activity_limit: limits.activity,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the user's config directory.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save to the user's config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn to_store_options(&self) -> StoreOptions {
        StoreOptions {
            auto_recompute: self.auto_recompute,
            compute: ComputeConfig {
                intent_selector: self.intent_selection.strategy(),
                ..ComputeConfig::default()
            },
            limits: SnapshotLimits {
                up_next: self.up_next_limit,
                activity: self.activity_limit,
                ..SnapshotLimits::default()
            },
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
