// Application Layer - queue strategies, construction and configuration

pub mod config;
pub mod factory;
pub mod queue;
pub mod registry;

pub use config::{PoolConfig, QueueSystemConfig};
pub use factory::{create_queue, QueueFactory};
pub use queue::{AffinityQueue, DedicatedWorkerQueue, SharedPoolQueue};
pub use registry::QueueRegistry;
