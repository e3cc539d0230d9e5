// Domain Layer - Queue configuration values, actions and their failures

pub mod action;
pub mod error;
pub mod queue;
pub mod stats;

// Re-exports
pub use action::{Action, ActionResult, BoxError};
pub use error::ActionError;
pub use queue::{QueueId, QueueSpec, Strategy};
pub use stats::QueueStats;
