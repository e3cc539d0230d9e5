// Strand Core - Exclusive action queues
// Domain values, ports, queue strategies and their execution backends

pub mod application;
pub mod domain;
pub mod error;
pub mod executor;
pub mod port;

pub use application::{create_queue, QueueFactory, QueueRegistry, QueueSystemConfig};
pub use domain::{Action, ActionError, ActionResult, QueueId, QueueSpec, QueueStats, Strategy};
pub use error::{QueueError, Result};
pub use port::{AffinityContext, ErrorHandler, ExclusiveQueue, ExclusiveQueueExt};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
