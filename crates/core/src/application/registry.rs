//! QueueRegistry - named set of live queues
//!
//! Collaborators obtain a queue by name instead of holding construction
//! parameters. All queues share the registry's factory and error handler.

use super::config::QueueSystemConfig;
use super::factory::QueueFactory;
use crate::domain::{QueueSpec, QueueStats, Strategy};
use crate::error::{QueueError, Result};
use crate::port::{ErrorHandler, ExclusiveQueue};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

type QueueMap = HashMap<String, Arc<dyn ExclusiveQueue>>;

pub struct QueueRegistry {
    factory: QueueFactory,
    on_error: Arc<dyn ErrorHandler>,
    queues: RwLock<QueueMap>,
}

impl QueueRegistry {
    pub fn new(factory: QueueFactory, on_error: Arc<dyn ErrorHandler>) -> Self {
        Self {
            factory,
            on_error,
            queues: RwLock::new(HashMap::new()),
        }
    }

    /// Build every configured queue on the process-wide execution contexts
    ///
    /// # Errors
    /// - QueueError::Config if the configuration is invalid
    /// - any error from creating a queue; queues created so far are disposed
    pub fn from_config(config: &QueueSystemConfig, on_error: Arc<dyn ErrorHandler>) -> Result<Self> {
        Self::from_config_with_factory(config, QueueFactory::new(config.pool.clone()), on_error)
    }

    /// Build every configured queue with a caller-supplied factory
    pub fn from_config_with_factory(
        config: &QueueSystemConfig,
        factory: QueueFactory,
        on_error: Arc<dyn ErrorHandler>,
    ) -> Result<Self> {
        config.validate()?;

        let registry = Self::new(factory, on_error);
        for spec in &config.queues {
            if let Err(e) = registry.create(spec.clone()) {
                registry.dispose_all();
                return Err(e);
            }
        }

        info!(queues = registry.len(), "Queue registry initialized from config");
        Ok(registry)
    }

    /// Create and register a queue
    ///
    /// A disposed queue under the same name is replaced.
    ///
    /// # Errors
    /// - QueueError::DuplicateQueue if a live queue already has this name
    pub fn create(&self, spec: QueueSpec) -> Result<Arc<dyn ExclusiveQueue>> {
        let mut queues = self.write();
        if let Some(existing) = queues.get(spec.name()) {
            if !existing.is_disposed() {
                return Err(QueueError::DuplicateQueue(spec.name().to_string()));
            }
        }

        let queue = self.factory.create(spec, Arc::clone(&self.on_error))?;
        queues.insert(queue.name().to_string(), Arc::clone(&queue));
        Ok(queue)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ExclusiveQueue>> {
        self.read().get(name).cloned()
    }

    /// Return the live queue named `name`, creating it if needed
    ///
    /// # Errors
    /// - QueueError::InvalidArgument if the live queue uses a different strategy
    ///   or `name` is invalid
    pub fn get_or_create(&self, name: &str, strategy: Strategy) -> Result<Arc<dyn ExclusiveQueue>> {
        if let Some(queue) = self.get(name) {
            if !queue.is_disposed() {
                return Self::check_strategy(queue, strategy);
            }
        }

        match self.create(QueueSpec::new(name, strategy)?) {
            Err(QueueError::DuplicateQueue(_)) => {
                // Another caller created it first
                let queue = self
                    .get(name)
                    .ok_or_else(|| QueueError::Internal(format!("queue '{}' vanished", name)))?;
                Self::check_strategy(queue, strategy)
            }
            other => other,
        }
    }

    fn check_strategy(
        queue: Arc<dyn ExclusiveQueue>,
        strategy: Strategy,
    ) -> Result<Arc<dyn ExclusiveQueue>> {
        let existing = queue.spec().strategy();
        if existing != strategy {
            return Err(QueueError::InvalidArgument(format!(
                "queue '{}' already exists with strategy {}, requested {}",
                queue.name(),
                existing,
                strategy
            )));
        }
        Ok(queue)
    }

    /// Unregister and dispose one queue; false if no queue has this name
    pub fn dispose(&self, name: &str) -> bool {
        let removed = self.write().remove(name);
        match removed {
            Some(queue) => {
                queue.dispose();
                true
            }
            None => false,
        }
    }

    /// Unregister and dispose every queue
    ///
    /// Queues are disposed outside the registry lock, so an action that
    /// looks up a queue while being waited on cannot deadlock.
    pub fn dispose_all(&self) {
        let drained: Vec<_> = self.write().drain().collect();
        let count = drained.len();
        for (_, queue) in drained {
            queue.dispose();
        }
        if count > 0 {
            info!(count, "All registered queues disposed");
        }
    }

    /// Snapshot of every registered queue, sorted by name
    pub fn stats(&self) -> Vec<QueueStats> {
        let mut stats: Vec<_> = self.read().values().map(|q| q.stats()).collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, QueueMap> {
        self.queues
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, QueueMap> {
        self.queues
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::PoolConfig;
    use crate::port::affinity_context::mocks::ManualContext;
    use crate::port::error_handler::mocks::RecordingErrorHandler;
    use crate::port::ExclusiveQueueExt;
    use std::sync::mpsc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn registry() -> (QueueRegistry, Arc<ManualContext>) {
        let ui = Arc::new(ManualContext::new("manual-ui"));
        let factory = QueueFactory::default()
            .with_primary_context(ui.clone())
            .with_secondary_context(Arc::new(ManualContext::new("manual-ui-2")));
        (
            QueueRegistry::new(factory, Arc::new(RecordingErrorHandler::new())),
            ui,
        )
    }

    #[test]
    fn test_create_rejects_live_duplicate() {
        let (registry, _) = registry();
        let spec = QueueSpec::new("io", Strategy::SharedPool).unwrap();

        assert_ok!(registry.create(spec.clone()));
        let err = assert_err!(registry.create(spec.clone()));
        assert!(matches!(err, QueueError::DuplicateQueue(name) if name == "io"));

        // A disposed queue frees its name
        registry.get("io").unwrap().dispose();
        let replaced = assert_ok!(registry.create(spec));
        assert!(!replaced.is_disposed());
        registry.dispose_all();
    }

    #[test]
    fn test_get_or_create_returns_same_queue() {
        let (registry, _) = registry();

        let first = registry.get_or_create("script", Strategy::DedicatedWorker).unwrap();
        let second = registry.get_or_create("script", Strategy::DedicatedWorker).unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(registry.len(), 1);

        let err = assert_err!(registry.get_or_create("script", Strategy::SharedPool));
        assert!(matches!(err, QueueError::InvalidArgument(_)));
        registry.dispose_all();
    }

    #[test]
    fn test_dispose_by_name() {
        let (registry, _) = registry();
        let queue = registry.get_or_create("ui", Strategy::AffinityPrimary).unwrap();

        assert!(registry.dispose("ui"));
        assert!(!registry.dispose("ui"));
        assert!(queue.is_disposed());
        assert!(registry.get("ui").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stats_and_names_sorted() {
        let (registry, ui) = registry();
        let b = registry.get_or_create("b-ui", Strategy::AffinityPrimary).unwrap();
        registry.get_or_create("a-pool", Strategy::SharedPool).unwrap();

        b.post_fn(|| {}).unwrap();
        ui.run_pending();

        assert_eq!(registry.names(), vec!["a-pool".to_string(), "b-ui".to_string()]);
        let stats = registry.stats();
        assert_eq!(stats[1].name, "b-ui");
        assert_eq!(stats[1].completed, 1);
        registry.dispose_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_config_builds_all_queues() {
        let config = QueueSystemConfig {
            pool: PoolConfig::default(),
            queues: vec![
                QueueSpec::new("worker", Strategy::DedicatedWorker).unwrap(),
                QueueSpec::new("pool", Strategy::SharedPool).unwrap(),
            ],
        };
        let registry =
            QueueRegistry::from_config(&config, Arc::new(RecordingErrorHandler::new())).unwrap();
        assert_eq!(registry.names(), vec!["pool".to_string(), "worker".to_string()]);

        let (tx, rx) = mpsc::channel();
        registry
            .get("worker")
            .unwrap()
            .post_fn(move || tx.send(()).unwrap())
            .unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        registry.dispose_all();
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let spec = QueueSpec::new("twice", Strategy::SharedPool).unwrap();
        let config = QueueSystemConfig {
            pool: PoolConfig::default(),
            queues: vec![spec.clone(), spec],
        };
        let result = QueueRegistry::from_config(&config, Arc::new(RecordingErrorHandler::new()));
        assert!(matches!(result, Err(QueueError::Config(_))));
    }
}
