//! Daemon settings - TOML file layered under STRAND__* environment variables

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use strand_core::application::PoolConfig;
use strand_core::{QueueSpec, QueueSystemConfig, Strategy};

const DEFAULT_CONFIG_PATH: &str = "~/.strand/queues.toml";
const DEFAULT_HEARTBEAT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pool: PoolConfig,
    pub queues: Vec<QueueSpec>,
    /// Interval between heartbeat rounds and stats reports
    pub heartbeat_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            queues: Vec::new(),
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
        }
    }
}

impl Settings {
    /// Load from `STRAND_CONFIG` (or the default path) and the environment
    ///
    /// A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = std::env::var("STRAND_CONFIG")
            .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_CONFIG_PATH).into_owned());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let raw = Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("STRAND")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read settings from {}", path))?;

        let mut settings: Settings = raw
            .try_deserialize()
            .context("invalid queue settings")?;
        if settings.heartbeat_secs == 0 {
            settings.heartbeat_secs = DEFAULT_HEARTBEAT_SECS;
        }
        Ok(settings)
    }

    /// Queue system to build; one queue per strategy when none are configured
    pub fn queue_system(&self) -> Result<QueueSystemConfig> {
        let queues = if self.queues.is_empty() {
            Strategy::ALL
                .into_iter()
                .map(|strategy| QueueSpec::new(strategy.as_str(), strategy))
                .collect::<strand_core::Result<Vec<_>>>()?
        } else {
            self.queues.clone()
        };

        let system = QueueSystemConfig {
            pool: self.pool.clone(),
            queues,
        };
        system.validate()?;
        Ok(system)
    }
}
