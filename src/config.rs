pub const DEFAULT_THREAD_NAME_PREFIX: &str = "weaver-worker";

/// Configuration for a [`ThreadPool`](crate::pool::ThreadPool).
///
/// The pool size is fixed for the lifetime of the pool; there is no dynamic
/// add/remove of workers after construction.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// The number of worker threads. A size of zero is legal and yields a
    /// pool that accepts submissions but never executes them.
    pub pool_size: usize,

    /// Prefix for worker thread names; the worker index is appended.
    pub thread_name_prefix: String,

    /// Stack size for worker threads, in bytes. `None` uses the platform
    /// default.
    pub thread_stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: num_cpus::get(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            thread_stack_size: None,
        }
    }
}

impl PoolConfig {
    /// Configuration with an explicit pool size and defaults for everything
    /// else.
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Default::default()
        }
    }
}
