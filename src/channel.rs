//! # Dispatch Channel Module
//!
//! The handoff seam between producers and workers: a lock-free MPMC queue
//! paired with a counting semaphore. The semaphore count is the
//! synchronization backbone: every successful push and every shutdown wake
//! corresponds to exactly one released permit, so at any instant the permit
//! count covers every released-but-unclaimed task.
//!
//! ## Thread Safety
//! - `push` is safe under any number of concurrent producers
//! - `try_claim` is safe under concurrent consumers, each using its own
//!   [`ConsumerToken`]
//! - A claimed task is fully visible to the claiming worker; ordering is
//!   inherited from the queue's CAS protocol and the semaphore's mutex

use crossbeam_deque::{Injector, Steal, Worker as LocalQueue};

use crate::semaphore::Semaphore;

/// Outcome of a single claim attempt.
pub(crate) enum Claim<T> {
    /// A task was claimed; ownership transfers to the caller.
    Task(T),
    /// The queue was observed empty. Callers check the stop flag and retry.
    Empty,
    /// The underlying algorithm lost a race with another consumer; the queue
    /// may be non-empty. Callers retry immediately.
    Retry,
}

/// Per-consumer claim handle.
///
/// One token per worker thread, created at worker start and held for the
/// channel's lifetime. Claims go through the token's private handle rather
/// than a shared access path, keeping consumers off each other's cache
/// lines. Not shared across threads.
pub(crate) struct ConsumerToken<T> {
    local: LocalQueue<T>,
}

/// Pairing of the task queue with the permit semaphore.
///
/// Thin composition with no state machine of its own; each pool instance
/// owns exactly one channel.
pub(crate) struct DispatchChannel<T> {
    queue: Injector<T>,
    permits: Semaphore,
}

impl<T: Send> DispatchChannel<T> {
    pub(crate) fn new() -> Self {
        Self {
            queue: Injector::new(),
            permits: Semaphore::new(),
        }
    }

    /// Pushes a task and releases its permit. Never blocks, never fails;
    /// the queue is unbounded.
    pub(crate) fn push(&self, task: T) {
        self.queue.push(task);
        self.permits.release(1);
    }

    /// Blocks until a permit is available and consumes it. Returning means
    /// either a task has been released or a shutdown wake was issued.
    pub(crate) fn wait_permit(&self) {
        self.permits.acquire();
    }

    /// Releases `count` permits carrying no task, one guaranteed wake per
    /// worker during teardown.
    pub(crate) fn release_shutdown_permits(&self, count: usize) {
        self.permits.release(count);
    }

    /// Creates the claim handle a consumer thread holds for its lifetime.
    pub(crate) fn consumer_token(&self) -> ConsumerToken<T> {
        ConsumerToken {
            local: LocalQueue::new_fifo(),
        }
    }

    /// Attempts to claim exactly one task through `token`.
    ///
    /// The claim limit is pinned to one: a batch claim would strand tasks in
    /// this consumer's private handle while sibling workers hold the permits
    /// released for them.
    pub(crate) fn try_claim(&self, token: &ConsumerToken<T>) -> Claim<T> {
        if let Some(task) = token.local.pop() {
            return Claim::Task(task);
        }
        match self.queue.steal_batch_with_limit_and_pop(&token.local, 1) {
            Steal::Success(task) => Claim::Task(task),
            Steal::Empty => Claim::Empty,
            Steal::Retry => Claim::Retry,
        }
    }

    /// Snapshot of the number of released-but-unclaimed tasks. May be stale
    /// by the time the value is used; metrics only.
    pub(crate) fn queued_tasks(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim_now(channel: &DispatchChannel<u32>, token: &ConsumerToken<u32>) -> Option<u32> {
        loop {
            match channel.try_claim(token) {
                Claim::Task(task) => return Some(task),
                Claim::Empty => return None,
                Claim::Retry => continue,
            }
        }
    }

    #[test]
    fn push_then_claim_transfers_the_task() {
        let channel = DispatchChannel::new();
        let token = channel.consumer_token();

        channel.push(42);
        assert_eq!(channel.queued_tasks(), 1);
        assert_eq!(claim_now(&channel, &token), Some(42));
        assert_eq!(channel.queued_tasks(), 0);
    }

    #[test]
    fn claim_on_empty_channel_reports_empty() {
        let channel = DispatchChannel::<u32>::new();
        let token = channel.consumer_token();
        assert_eq!(claim_now(&channel, &token), None);
    }

    #[test]
    fn each_claim_takes_exactly_one_task() {
        let channel = DispatchChannel::new();
        let first = channel.consumer_token();
        let second = channel.consumer_token();

        channel.push(1);
        channel.push(2);

        // Two consumers, one claim each; neither claim may hoard the other's
        // task in its private handle.
        assert!(claim_now(&channel, &first).is_some());
        assert!(claim_now(&channel, &second).is_some());
        assert_eq!(channel.queued_tasks(), 0);
    }

    #[test]
    fn permits_track_pushes() {
        let channel = DispatchChannel::new();
        channel.push(7u32);
        // The permit for the pushed task must already be available.
        channel.wait_permit();
    }
}
