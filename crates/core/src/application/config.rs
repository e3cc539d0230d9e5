// Queue system configuration

use super::queue::constants::{DEFAULT_POOL_MAX_THREADS, DEFAULT_POOL_THREAD_NAME};
use crate::domain::QueueSpec;
use crate::error::{QueueError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Shared pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on pool threads shared by all shared-pool queues
    pub max_threads: usize,
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_threads: DEFAULT_POOL_MAX_THREADS,
            thread_name: DEFAULT_POOL_THREAD_NAME.to_string(),
        }
    }
}

impl PoolConfig {
    /// # Errors
    /// - QueueError::Config for zero threads or a blank thread name
    pub fn validate(&self) -> Result<()> {
        if self.max_threads == 0 {
            return Err(QueueError::Config(
                "pool.max_threads must be at least 1".to_string(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(QueueError::Config(
                "pool.thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything a host needs to build its queues
///
/// # Example (TOML)
/// ```text
/// [pool]
/// max_threads = 16
///
/// [[queues]]
/// name = "script"
/// strategy = "dedicated_worker"
///
/// [[queues]]
/// name = "ui"
/// strategy = "affinity_primary"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSystemConfig {
    pub pool: PoolConfig,
    pub queues: Vec<QueueSpec>,
}

impl QueueSystemConfig {
    pub fn validate(&self) -> Result<()> {
        self.pool.validate()?;

        let mut seen = HashSet::new();
        for spec in &self.queues {
            spec.validate()?;
            if !seen.insert(spec.name()) {
                return Err(QueueError::Config(format!(
                    "queue '{}' is defined more than once",
                    spec.name()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Strategy;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: QueueSystemConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.pool, PoolConfig::default());
        assert!(config.queues.is_empty());
        assert_ok!(config.validate());
    }

    #[test]
    fn test_config_parses_queue_list() {
        let config: QueueSystemConfig = serde_json::from_str(
            r#"{
                "pool": { "max_threads": 4 },
                "queues": [
                    { "name": "ui", "strategy": "AffinityPrimary" },
                    { "name": "io", "strategy": "shared_pool" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.pool.max_threads, 4);
        assert_eq!(config.pool.thread_name, DEFAULT_POOL_THREAD_NAME);
        assert_eq!(config.queues.len(), 2);
        assert_eq!(config.queues[0].strategy(), Strategy::AffinityPrimary);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_zero_threads() {
        let spec = QueueSpec::new("dup", Strategy::SharedPool).unwrap();
        let config = QueueSystemConfig {
            pool: PoolConfig::default(),
            queues: vec![spec.clone(), spec],
        };
        let err = assert_err!(config.validate());
        assert!(err.to_string().contains("more than once"));

        let config = QueueSystemConfig {
            pool: PoolConfig {
                max_threads: 0,
                ..PoolConfig::default()
            },
            queues: vec![],
        };
        assert!(matches!(assert_err!(config.validate()), QueueError::Config(_)));
    }
}
