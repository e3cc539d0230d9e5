//! Strand - Main Entry Point
//! Builds the configured queues, keeps them busy with heartbeat actions and
//! reports their counters until Ctrl+C.

mod logging;
mod settings;

use anyhow::{Context, Result};
use settings::Settings;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use strand_core::executor::SharedPool;
use strand_core::port::LoggingErrorHandler;
use strand_core::{ExclusiveQueueExt, QueueFactory, QueueRegistry};
use tracing::{debug, info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // 1. Initialize logging
    let _log_guard = logging::init()?;
    info!("Strand v{} starting...", VERSION);

    // 2. Load configuration
    let settings = Settings::load()?;
    let system = settings.queue_system()?;

    // 3. Runtime whose blocking pool backs the shared-pool queues
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(system.pool.max_threads)
        .thread_name(system.pool.thread_name.clone())
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(run(settings, system))
}

async fn run(settings: Settings, system: strand_core::QueueSystemConfig) -> Result<()> {
    // 4. Wire queues (DI)
    let pool = SharedPool::current().context("not running inside a runtime")?;
    let factory = QueueFactory::new(system.pool.clone()).with_pool(pool);
    let registry = Arc::new(QueueRegistry::from_config_with_factory(
        &system,
        factory,
        Arc::new(LoggingErrorHandler::new("strand-daemon")),
    )?);

    for name in registry.names() {
        info!(queue = %name, "Queue ready");
    }
    info!("System ready. Press Ctrl+C to shutdown");

    // 5. Heartbeat until shutdown
    let beats = Arc::new(AtomicU64::new(0));
    let mut ticker = tokio::time::interval(Duration::from_secs(settings.heartbeat_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => heartbeat(&registry, &beats),
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                break;
            }
        }
    }

    info!("Shutdown signal received. Disposing queues...");

    // 6. Graceful shutdown; disposal blocks until running actions finish
    let disposing = Arc::clone(&registry);
    tokio::task::spawn_blocking(move || disposing.dispose_all())
        .await
        .context("queue disposal task failed")?;

    info!(
        heartbeats = beats.load(Ordering::Relaxed),
        "Shutdown complete."
    );
    Ok(())
}

/// Post one heartbeat to every queue and log the counters
fn heartbeat(registry: &Arc<QueueRegistry>, beats: &Arc<AtomicU64>) {
    for name in registry.names() {
        let Some(queue) = registry.get(&name) else {
            continue;
        };

        let beats = Arc::clone(beats);
        let queue_name = name.clone();
        let posted = queue.post_fn(move || {
            let beat = beats.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(queue = %queue_name, beat, "Heartbeat");
        });
        if let Err(e) = posted {
            warn!(queue = %name, error = %e, "Heartbeat not submitted");
        }
    }

    for stats in registry.stats() {
        info!(
            queue = %stats.name,
            strategy = %stats.strategy,
            submitted = stats.submitted,
            completed = stats.completed,
            failed = stats.failed,
            dropped = stats.dropped,
            pending = stats.pending(),
            "Queue stats"
        );
    }
}
