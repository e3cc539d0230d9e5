//! QueueFactory - maps a QueueSpec's strategy to its implementation
//!
//! Execution contexts default to the process-wide ones (primary/secondary
//! dispatcher, global shared pool) and are only started when a queue first
//! needs them. Hosts and tests can inject their own.

use super::config::PoolConfig;
use super::queue::{AffinityQueue, DedicatedWorkerQueue, SharedPoolQueue};
use crate::domain::{QueueSpec, Strategy};
use crate::error::Result;
use crate::executor::{DispatcherThread, SharedPool};
use crate::port::{AffinityContext, ErrorHandler, ExclusiveQueue};
use std::sync::Arc;
use tracing::info;

/// Builds queues for any strategy
#[derive(Default)]
pub struct QueueFactory {
    pool_config: PoolConfig,
    primary: Option<Arc<dyn AffinityContext>>,
    secondary: Option<Arc<dyn AffinityContext>>,
    pool: Option<SharedPool>,
}

impl QueueFactory {
    pub fn new(pool_config: PoolConfig) -> Self {
        Self {
            pool_config,
            ..Self::default()
        }
    }

    /// Bind `AffinityPrimary` queues to `context` instead of the primary dispatcher
    pub fn with_primary_context(mut self, context: Arc<dyn AffinityContext>) -> Self {
        self.primary = Some(context);
        self
    }

    /// Bind `AffinitySecondary` queues to `context` instead of the secondary dispatcher
    pub fn with_secondary_context(mut self, context: Arc<dyn AffinityContext>) -> Self {
        self.secondary = Some(context);
        self
    }

    /// Run `SharedPool` queues on `pool` instead of the global pool
    pub fn with_pool(mut self, pool: SharedPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Create a queue for `spec`, reporting action failures to `on_error`
    ///
    /// # Errors
    /// - QueueError::InvalidArgument if `spec.name()` is invalid
    /// - QueueError::Config if the shared pool configuration is invalid
    /// - QueueError::Io / QueueError::Internal if the execution context cannot be started
    pub fn create(
        &self,
        spec: QueueSpec,
        on_error: Arc<dyn ErrorHandler>,
    ) -> Result<Arc<dyn ExclusiveQueue>> {
        spec.validate()?;
        let strategy = spec.strategy();

        let queue: Arc<dyn ExclusiveQueue> = match strategy {
            Strategy::AffinityPrimary => {
                Arc::new(AffinityQueue::new(spec, self.primary_context()?, on_error))
            }
            Strategy::AffinitySecondary => {
                Arc::new(AffinityQueue::new(spec, self.secondary_context()?, on_error))
            }
            Strategy::DedicatedWorker => Arc::new(DedicatedWorkerQueue::spawn(spec, on_error)?),
            Strategy::SharedPool => Arc::new(SharedPoolQueue::new(spec, self.pool()?, on_error)),
        };

        info!(queue = %queue.name(), strategy = %strategy, id = %queue.id(), "Queue created");
        Ok(queue)
    }

    /// Create a queue from raw configuration strings
    ///
    /// # Errors
    /// - QueueError::UnsupportedStrategy if `strategy` names no known strategy
    /// - QueueError::InvalidArgument if `name` is invalid
    pub fn create_from_parts(
        &self,
        name: &str,
        strategy: &str,
        on_error: Arc<dyn ErrorHandler>,
    ) -> Result<Arc<dyn ExclusiveQueue>> {
        let spec = QueueSpec::new(name, strategy.parse()?)?;
        self.create(spec, on_error)
    }

    fn primary_context(&self) -> Result<Arc<dyn AffinityContext>> {
        if let Some(context) = &self.primary {
            return Ok(Arc::clone(context));
        }
        let dispatcher: Arc<dyn AffinityContext> = DispatcherThread::primary()?;
        Ok(dispatcher)
    }

    fn secondary_context(&self) -> Result<Arc<dyn AffinityContext>> {
        if let Some(context) = &self.secondary {
            return Ok(Arc::clone(context));
        }
        let dispatcher: Arc<dyn AffinityContext> = DispatcherThread::secondary()?;
        Ok(dispatcher)
    }

    fn pool(&self) -> Result<SharedPool> {
        match &self.pool {
            Some(pool) => Ok(pool.clone()),
            None => SharedPool::global(&self.pool_config),
        }
    }
}

/// Create a queue with the process-wide execution contexts
pub fn create_queue(
    spec: QueueSpec,
    on_error: Arc<dyn ErrorHandler>,
) -> Result<Arc<dyn ExclusiveQueue>> {
    QueueFactory::default().create(spec, on_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::port::affinity_context::mocks::ManualContext;
    use crate::port::error_handler::mocks::RecordingErrorHandler;
    use crate::port::ExclusiveQueueExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio_test::assert_err;

    fn manual_factory() -> (QueueFactory, Arc<ManualContext>, Arc<ManualContext>) {
        let primary = Arc::new(ManualContext::new("manual-primary"));
        let secondary = Arc::new(ManualContext::new("manual-secondary"));
        let factory = QueueFactory::default()
            .with_primary_context(primary.clone())
            .with_secondary_context(secondary.clone());
        (factory, primary, secondary)
    }

    #[test]
    fn test_creates_every_strategy() {
        let (factory, _, _) = manual_factory();
        let handler = Arc::new(RecordingErrorHandler::new());

        for strategy in Strategy::ALL {
            let spec = QueueSpec::new(format!("q-{}", strategy), strategy).unwrap();
            let queue = factory.create(spec, handler.clone()).unwrap();
            assert_eq!(queue.spec().strategy(), strategy);
            assert_eq!(queue.name(), format!("q-{}", strategy));
            assert!(!queue.is_disposed());
            queue.dispose();
            assert!(queue.is_disposed());
        }
    }

    #[test]
    fn test_affinity_strategies_bind_to_their_context() {
        let (factory, primary, secondary) = manual_factory();
        let handler = Arc::new(RecordingErrorHandler::new());
        let ran_primary = Arc::new(AtomicBool::new(false));
        let ran_secondary = Arc::new(AtomicBool::new(false));

        let q1 = factory
            .create_from_parts("ui-1", "affinity_primary", handler.clone())
            .unwrap();
        let q2 = factory
            .create_from_parts("ui-2", "AffinitySecondary", handler)
            .unwrap();

        let flag = Arc::clone(&ran_primary);
        q1.post_fn(move || flag.store(true, Ordering::SeqCst)).unwrap();
        let flag = Arc::clone(&ran_secondary);
        q2.post_fn(move || flag.store(true, Ordering::SeqCst)).unwrap();

        assert_eq!(secondary.run_pending(), 1);
        assert!(ran_secondary.load(Ordering::SeqCst));
        assert!(!ran_primary.load(Ordering::SeqCst));

        assert_eq!(primary.run_pending(), 1);
        assert!(ran_primary.load(Ordering::SeqCst));
    }

    #[test]
    fn test_unknown_strategy_is_unsupported() {
        let (factory, _, _) = manual_factory();
        let err = assert_err!(factory.create_from_parts(
            "q",
            "round_robin",
            Arc::new(RecordingErrorHandler::new())
        ));
        assert!(matches!(err, QueueError::UnsupportedStrategy(_)));
    }

    #[test]
    fn test_invalid_name_is_invalid_argument() {
        let (factory, _, _) = manual_factory();
        let err = assert_err!(factory.create_from_parts(
            "",
            "dedicated_worker",
            Arc::new(RecordingErrorHandler::new())
        ));
        assert!(matches!(err, QueueError::InvalidArgument(_)));
    }

    #[test]
    fn test_closure_error_handler() {
        let seen = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&seen);
        let (tx, rx) = std::sync::mpsc::channel();

        let spec = QueueSpec::new("closure-handler", Strategy::DedicatedWorker).unwrap();
        let queue = create_queue(
            spec,
            Arc::new(move |err: crate::domain::ActionError| {
                flag.store(err.is_panic(), Ordering::SeqCst);
            }),
        )
        .unwrap();

        queue.post_fn(|| panic!("handled by closure")).unwrap();
        queue.post_fn(move || tx.send(()).unwrap()).unwrap();
        rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert!(seen.load(Ordering::SeqCst));
        queue.dispose();
    }

    #[test]
    fn test_zero_thread_pool_config_is_rejected() {
        let factory = QueueFactory::new(PoolConfig {
            max_threads: 0,
            ..PoolConfig::default()
        });
        let spec = QueueSpec::new("no-threads", Strategy::SharedPool).unwrap();
        let err = assert_err!(factory.create(spec, Arc::new(RecordingErrorHandler::new())));
        assert!(matches!(err, QueueError::Config(_)));
    }
}
