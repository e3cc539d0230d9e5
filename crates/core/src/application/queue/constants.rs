// Queue constants (no magic values)

/// Default upper bound on shared pool threads
pub const DEFAULT_POOL_MAX_THREADS: usize = 32;

/// Default thread name for shared pool threads
pub const DEFAULT_POOL_THREAD_NAME: &str = "strand-pool";

/// Actions one shared pool drain runs before yielding its pool thread
pub const POOL_DRAIN_BATCH: usize = 64;

/// Actions one affinity drain runs before yielding back to the UI loop
pub const AFFINITY_DRAIN_BATCH: usize = 256;

/// Thread name prefix for dedicated workers (`strand-worker-<queue>`)
pub const WORKER_THREAD_PREFIX: &str = "strand-worker";

/// Thread name of the process-wide primary UI-affinity dispatcher
pub const PRIMARY_DISPATCHER_NAME: &str = "strand-ui-primary";

/// Thread name of the process-wide secondary UI-affinity dispatcher
pub const SECONDARY_DISPATCHER_NAME: &str = "strand-ui-secondary";
