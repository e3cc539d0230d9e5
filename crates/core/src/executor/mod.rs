// Executor Layer - In-process execution contexts the queue strategies run on

pub mod dispatcher;
pub mod pool;

// Re-exports
pub use dispatcher::DispatcherThread;
pub use pool::SharedPool;
