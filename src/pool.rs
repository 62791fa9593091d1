//! # Pool Module
//!
//! The pool controller: owns the fixed set of worker threads, the stop
//! flag, and the construction/teardown protocol.
//!
//! ## Key Concepts
//! - Fixed size: workers are created once at construction and live until
//!   the pool is dropped; no dynamic resizing
//! - Handoff: every submission pushes a task and releases one permit; idle
//!   workers block on the permit semaphore
//! - Soft-stop: dropping the pool requests workers to stop, but a task that
//!   is already visible in the queue may still execute before its worker
//!   observes the stop flag
//!
//! ## Thread Safety
//! - `enqueue` takes `&self` and is safe from any number of producer
//!   threads
//! - Teardown requires ownership (`Drop`), so no producer can race the
//!   destructor in safe code; producers must stop before the pool can be
//!   dropped

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::channel::DispatchChannel;
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::policy::{BoxTask, DirectInvoke, InitPolicy, InvokePolicy, NoopInit, Task};
use crate::worker::Worker;

/// Metrics about the pool state.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Number of worker threads in the pool.
    pub pool_size: usize,

    /// Snapshot of the number of submitted-but-unclaimed tasks.
    pub queued_tasks: usize,
}

/// A fixed-size worker thread pool.
///
/// Tasks are any type implementing [`Task`]; the default is [`BoxTask`], a
/// boxed closure. Per-worker initialization and per-task invocation are
/// injected as [`InitPolicy`] / [`InvokePolicy`] values at construction and
/// shared read-only across all workers.
///
/// # Submission
/// [`enqueue`](ThreadPool::enqueue) never blocks and never fails; the
/// underlying queue is unbounded. Tasks from a single producer are made
/// visible in submission order, but no ordering is guaranteed across
/// producers.
///
/// # Teardown
/// Dropping the pool sets the stop flag, issues one wake per worker, and
/// joins every worker thread. Shutdown is soft: workers finish in-flight
/// work, and a task already visible in the queue may still execute after
/// the drop began. Tasks still unclaimed when their worker observes the
/// stop flag are discarded with the pool; draining is not guaranteed.
///
/// # Worker failure
/// The pool does not catch panics. A panicking task (or invoke policy)
/// terminates its worker thread, silently reducing effective concurrency;
/// the loss is detected and logged when the pool is dropped. Embedders that
/// need isolation build it into the invoke policy.
pub struct ThreadPool<T: Task = BoxTask> {
    channel: Arc<DispatchChannel<T>>,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Task> ThreadPool<T> {
    /// Creates a pool with `pool_size` workers and the default (no-op)
    /// policies.
    ///
    /// A size of zero is legal: the pool accepts submissions but never
    /// executes them, and still tears down cleanly.
    pub fn new(pool_size: usize) -> Result<Self, PoolError> {
        Self::with_config(PoolConfig::with_pool_size(pool_size))
    }

    /// Creates a pool from an explicit configuration, with default policies.
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        Self::with_policies(config, NoopInit, DirectInvoke)
    }

    /// Creates a pool with a custom init policy and the default invoke
    /// policy.
    pub fn with_init<I>(config: PoolConfig, init: I) -> Result<Self, PoolError>
    where
        I: InitPolicy,
    {
        Self::with_policies(config, init, DirectInvoke)
    }

    /// Creates a pool with explicit policies.
    ///
    /// All worker threads are spawned before this returns. If any spawn
    /// fails, the workers spawned so far are shut down through the normal
    /// stop-and-join protocol and the error is returned.
    pub fn with_policies<I, V>(config: PoolConfig, init: I, invoke: V) -> Result<Self, PoolError>
    where
        I: InitPolicy,
        V: InvokePolicy<T>,
    {
        let channel = Arc::new(DispatchChannel::new());
        let stop = Arc::new(AtomicBool::new(false));
        let init = Arc::new(init);
        let invoke = Arc::new(invoke);

        let mut workers = Vec::with_capacity(config.pool_size);
        for index in 0..config.pool_size {
            let worker = Worker::new(
                index,
                channel.clone(),
                stop.clone(),
                init.clone(),
                invoke.clone(),
            );
            let name = format!("{}-{}", config.thread_name_prefix, index);
            match worker.spawn(name, config.thread_stack_size) {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    stop.store(true, Ordering::SeqCst);
                    channel.release_shutdown_permits(workers.len());
                    for handle in workers.drain(..) {
                        let _ = handle.join();
                    }
                    return Err(PoolError::ThreadSpawn { index, source });
                }
            }
        }

        debug!(pool_size = workers.len(), "thread pool started");

        Ok(Self {
            channel,
            stop,
            workers,
        })
    }

    /// Submits a task for execution on some worker.
    ///
    /// Pushes the task into the dispatch channel and releases one permit.
    /// Never blocks; safe to call concurrently from any number of producer
    /// threads.
    pub fn enqueue(&self, task: T) {
        self.channel.push(task);
    }

    /// The number of worker threads.
    pub fn pool_size(&self) -> usize {
        self.workers.len()
    }

    /// Get metrics about the pool.
    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            pool_size: self.workers.len(),
            queued_tasks: self.channel.queued_tasks(),
        }
    }
}

impl ThreadPool<BoxTask> {
    /// Boxing convenience over [`enqueue`](ThreadPool::enqueue) for the
    /// default task type.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Box::new(f));
    }
}

impl<T: Task> fmt::Debug for ThreadPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("pool_size", &self.workers.len())
            .field("queued_tasks", &self.channel.queued_tasks())
            .finish()
    }
}

impl<T: Task> Drop for ThreadPool<T> {
    /// Sets the stop flag, releases exactly one wake permit per worker, and
    /// joins every worker thread. Runs exactly once; see the type-level
    /// notes on soft-stop semantics.
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        self.channel.release_shutdown_permits(self.workers.len());
        debug!(pool_size = self.workers.len(), "shutting down thread pool");

        for handle in self.workers.drain(..) {
            let name = handle
                .thread()
                .name()
                .unwrap_or("<unnamed>")
                .to_string();
            if handle.join().is_err() {
                warn!(thread = %name, "worker thread had panicked; joined its remains");
            }
        }
    }
}
