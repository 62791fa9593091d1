// Weaver: a fixed-size worker thread pool.
//
// Work items are handed off from arbitrary producer threads to a bounded set
// of long-lived workers through a lock-free queue paired with a counting
// semaphore. Per-worker initialization and per-task invocation are pluggable
// policies resolved at construction time.

pub mod config;
pub mod error;
pub mod logging;
pub mod policy;
pub mod pool;

mod channel;
mod semaphore;
mod worker;

// Re-export key types for easier usage
pub use config::PoolConfig;
pub use error::PoolError;
pub use policy::{BoxTask, DirectInvoke, InitPolicy, InvokePolicy, NoopInit, Task};
pub use pool::{PoolMetrics, ThreadPool};
