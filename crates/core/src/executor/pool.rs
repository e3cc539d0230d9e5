// Shared pool - tokio blocking pool that shared-pool queues borrow threads from

use crate::application::config::PoolConfig;
use crate::error::{QueueError, Result};
use std::sync::OnceLock;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::info;

static GLOBAL_RUNTIME: OnceLock<std::result::Result<Runtime, String>> = OnceLock::new();

/// Handle to a thread pool shared by any number of queues
///
/// Cloning is cheap; all clones feed the same pool.
#[derive(Clone, Debug)]
pub struct SharedPool {
    handle: Handle,
}

impl SharedPool {
    /// Process-wide pool, built on first use
    ///
    /// The first caller's configuration wins; later valid configurations are ignored.
    ///
    /// # Errors
    /// - QueueError::Config if `config` is invalid
    /// - QueueError::Internal if the runtime cannot be built
    pub fn global(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        let runtime = GLOBAL_RUNTIME.get_or_init(|| {
            info!(
                max_threads = config.max_threads,
                thread_name = %config.thread_name,
                "Building shared pool"
            );
            Builder::new_multi_thread()
                .worker_threads(1)
                .max_blocking_threads(config.max_threads)
                .thread_name(config.thread_name.clone())
                .build()
                .map_err(|e| e.to_string())
        });

        match runtime {
            Ok(runtime) => Ok(Self::from_handle(runtime.handle().clone())),
            Err(msg) => Err(QueueError::Internal(format!(
                "shared pool unavailable: {}",
                msg
            ))),
        }
    }

    /// Borrow the blocking pool of an existing runtime
    ///
    /// Queues stall if that runtime shuts down while they still have work.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// The runtime the caller is running in, if any
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::from_handle)
    }

    /// Run a blocking job on a pool thread; the job is detached
    ///
    /// If the runtime is shut down before the job starts, the job is dropped
    /// unrun and `on_cancel` runs instead.
    pub(crate) fn spawn<F, C>(&self, job: F, on_cancel: C)
    where
        F: FnOnce() + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let guard = CancelGuard(Some(Box::new(on_cancel)));
        drop(self.handle.spawn_blocking(move || {
            let mut guard = guard;
            guard.disarm();
            job()
        }));
    }
}

/// Runs its callback when dropped while still armed
struct CancelGuard(Option<Box<dyn FnOnce() + Send>>);

impl CancelGuard {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if let Some(on_cancel) = self.0.take() {
            on_cancel();
        }
    }
}
