// Queue Domain Model

use crate::error::{QueueError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Upper bound on queue names (they end up in thread names and log fields)
pub const MAX_QUEUE_NAME_LEN: usize = 128;

/// Identity of one live queue instance
///
/// Two queues created from equal specs still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueId(Uuid);

impl QueueId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QueueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Execution strategy backing a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    /// The process's primary UI-affinity context
    AffinityPrimary,
    /// An independently created secondary UI-affinity context
    AffinitySecondary,
    /// One persistent background worker thread
    DedicatedWorker,
    /// A shared pool slot with concurrency capped at one
    SharedPool,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::AffinityPrimary,
        Strategy::AffinitySecondary,
        Strategy::DedicatedWorker,
        Strategy::SharedPool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::AffinityPrimary => "affinity_primary",
            Strategy::AffinitySecondary => "affinity_secondary",
            Strategy::DedicatedWorker => "dedicated_worker",
            Strategy::SharedPool => "shared_pool",
        }
    }

    fn pascal_name(&self) -> &'static str {
        match self {
            Strategy::AffinityPrimary => "AffinityPrimary",
            Strategy::AffinitySecondary => "AffinitySecondary",
            Strategy::DedicatedWorker => "DedicatedWorker",
            Strategy::SharedPool => "SharedPool",
        }
    }

    pub fn is_affinity(&self) -> bool {
        matches!(self, Strategy::AffinityPrimary | Strategy::AffinitySecondary)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = QueueError;

    /// Accepts `shared_pool` or `shared-pool` in any casing, and `SharedPool`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let snake = trimmed.to_lowercase().replace('-', "_");

        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == snake || strategy.pascal_name() == trimmed)
            .ok_or_else(|| QueueError::UnsupportedStrategy(s.to_string()))
    }
}

impl TryFrom<String> for Strategy {
    type Error = QueueError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// Immutable queue configuration: a name plus the strategy backing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQueueSpec")]
pub struct QueueSpec {
    name: String,
    strategy: Strategy,
}

#[derive(Deserialize)]
struct RawQueueSpec {
    name: String,
    strategy: Strategy,
}

impl TryFrom<RawQueueSpec> for QueueSpec {
    type Error = QueueError;

    fn try_from(raw: RawQueueSpec) -> Result<Self> {
        QueueSpec::new(raw.name, raw.strategy)
    }
}

impl QueueSpec {
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Result<Self> {
        let spec = Self {
            name: name.into(),
            strategy,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Check the name invariants (non-blank, bounded, no control characters)
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(QueueError::InvalidArgument(
                "queue name must not be empty".to_string(),
            ));
        }
        if self.name.chars().count() > MAX_QUEUE_NAME_LEN {
            return Err(QueueError::InvalidArgument(format!(
                "queue name too long (max {} characters)",
                MAX_QUEUE_NAME_LEN
            )));
        }
        if self.name.chars().any(char::is_control) {
            return Err(QueueError::InvalidArgument(format!(
                "queue name contains control characters: {:?}",
                self.name
            )));
        }
        Ok(())
    }
}
