// Port Layer - Interfaces between queues and their collaborators

pub mod affinity_context;
pub mod error_handler;
pub mod exclusive_queue;

// Re-exports
pub use affinity_context::{AffinityContext, Callback};
pub use error_handler::{ErrorHandler, LoggingErrorHandler};
pub use exclusive_queue::{ExclusiveQueue, ExclusiveQueueExt};
