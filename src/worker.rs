//! # Worker Module
//!
//! The per-thread consumption protocol.
//!
//! ## Core Algorithm
//! 1. Run the init policy with this worker's index, once
//! 2. Block on the permit semaphore
//! 3. Attempt to claim a task; on a failed attempt, consult the stop flag
//! 4. Invoke the claimed task through the invoke policy
//! 5. Repeat from 2 until the stop flag is observed on a failed claim
//!
//! ## Shutdown Behavior
//! A worker exits only after consuming a permit and observing an empty
//! queue while the stop flag is set. A task that is already visible when
//! stop is set may therefore still execute; shutdown is cooperative, not
//! an abort.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::trace;

use crate::channel::{Claim, ConsumerToken, DispatchChannel};
use crate::policy::{InitPolicy, InvokePolicy, Task};

/// One worker: an identity index plus shared handles to the channel, the
/// stop flag, and the policies. Consumed by [`spawn`](Worker::spawn), which
/// moves it onto its OS thread.
pub(crate) struct Worker<T, I, V>
where
    T: Task,
    I: InitPolicy,
    V: InvokePolicy<T>,
{
    index: usize,
    channel: Arc<DispatchChannel<T>>,
    stop: Arc<AtomicBool>,
    init: Arc<I>,
    invoke: Arc<V>,
}

impl<T, I, V> Worker<T, I, V>
where
    T: Task,
    I: InitPolicy,
    V: InvokePolicy<T>,
{
    pub(crate) fn new(
        index: usize,
        channel: Arc<DispatchChannel<T>>,
        stop: Arc<AtomicBool>,
        init: Arc<I>,
        invoke: Arc<V>,
    ) -> Self {
        Self {
            index,
            channel,
            stop,
            init,
            invoke,
        }
    }

    /// Spawns the worker's OS thread running the consumption loop.
    pub(crate) fn spawn(
        self,
        name: String,
        stack_size: Option<usize>,
    ) -> io::Result<JoinHandle<()>> {
        let mut builder = thread::Builder::new().name(name);
        if let Some(stack_size) = stack_size {
            builder = builder.stack_size(stack_size);
        }
        builder.spawn(move || self.run())
    }

    fn run(self) {
        self.init.init(self.index);
        let token = self.channel.consumer_token();
        trace!(worker = self.index, "worker started");

        loop {
            self.channel.wait_permit();
            match self.claim(&token) {
                Some(task) => self.invoke.invoke(task),
                None => break,
            }
        }

        trace!(worker = self.index, "worker stopped");
    }

    /// Claims the next task, spinning through failed attempts.
    ///
    /// A permit was just consumed, so a failed attempt means either the
    /// corresponding task is not yet visible in the queue (a benign race of
    /// the lock-free algorithm, about to resolve) or the permit was a
    /// shutdown wake (the stop flag is about to be observed). Either way the
    /// loop is bounded in practice, so retrying beats re-blocking.
    ///
    /// Returns `None` when the stop flag is observed on a failed attempt.
    fn claim(&self, token: &ConsumerToken<T>) -> Option<T> {
        loop {
            match self.channel.try_claim(token) {
                Claim::Task(task) => {
                    trace!(worker = self.index, "claimed task");
                    return Some(task);
                }
                Claim::Retry => std::hint::spin_loop(),
                Claim::Empty => {
                    // Advisory read only; data visibility comes from the
                    // queue and semaphore, not from this flag.
                    if self.stop.load(Ordering::Relaxed) {
                        return None;
                    }
                    std::hint::spin_loop();
                }
            }
        }
    }
}
