// Queue strategies - one ExclusiveQueue implementation per execution context

pub mod affinity;
pub mod constants;
pub mod dedicated;
mod mailbox;
pub mod panic_guard;
mod scope;
pub mod shared_pool;
mod state;

pub use affinity::AffinityQueue;
pub use dedicated::DedicatedWorkerQueue;
pub use panic_guard::{execute_guarded, run_contained, PanicGuardResult};
pub use shared_pool::SharedPoolQueue;
