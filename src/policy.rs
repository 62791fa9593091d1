//! # Policy Module
//!
//! Customization points injected into the pool at construction time.
//!
//! ## Key Concepts
//! - Task: any move-only, nullary unit of work the pool can execute
//! - Init policy: runs once per worker thread, before any task is claimed
//! - Invoke policy: wraps every task execution on the worker thread
//!
//! ## Design Principles
//! - Static dispatch: policies are generic parameters, monomorphized into
//!   the worker loop, never trait objects on the hot path
//! - Shared state: one policy instance serves all workers through `&self`,
//!   so policies must be read-only after construction or internally
//!   thread-safe

/// A unit of work executable by the pool.
///
/// The pool never inspects a task's content and observes no return value;
/// tasks are fire-and-forget. `run` consumes the task, so move-only payloads
/// work naturally and the task is destroyed when invocation returns.
///
/// Implemented for every `FnOnce() + Send + 'static`, including boxed
/// closures ([`BoxTask`]).
pub trait Task: Send + 'static {
    fn run(self);
}

impl<F> Task for F
where
    F: FnOnce() + Send + 'static,
{
    fn run(self) {
        self()
    }
}

/// The default task type: a boxed, type-erased closure.
pub type BoxTask = Box<dyn FnOnce() + Send + 'static>;

/// Per-worker initialization hook.
///
/// Invoked exactly once per worker thread, on that thread, with the worker's
/// index in `[0, pool_size)`, before the worker claims any task.
///
/// Implemented for every `Fn(usize) + Send + Sync + 'static` closure.
pub trait InitPolicy: Send + Sync + 'static {
    fn init(&self, worker_index: usize);
}

impl<F> InitPolicy for F
where
    F: Fn(usize) + Send + Sync + 'static,
{
    fn init(&self, worker_index: usize) {
        self(worker_index)
    }
}

/// Per-task invocation wrapper.
///
/// Invoked once for every successfully claimed task, on the claiming worker
/// thread. The pool does not catch panics raised here or inside the task;
/// an embedder that needs isolation builds it into this policy (for example
/// with `std::panic::catch_unwind` around `task.run()`).
///
/// Implemented for every `Fn(T) + Send + Sync + 'static` closure.
pub trait InvokePolicy<T: Task>: Send + Sync + 'static {
    fn invoke(&self, task: T);
}

impl<T, F> InvokePolicy<T> for F
where
    T: Task,
    F: Fn(T) + Send + Sync + 'static,
{
    fn invoke(&self, task: T) {
        self(task)
    }
}

/// Default init policy: does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInit;

impl InitPolicy for NoopInit {
    fn init(&self, _worker_index: usize) {}
}

/// Default invoke policy: runs the task directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectInvoke;

impl<T: Task> InvokePolicy<T> for DirectInvoke {
    fn invoke(&self, task: T) {
        task.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn direct_invoke_runs_the_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let task: BoxTask = Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        DirectInvoke.invoke(task);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closures_are_policies() {
        let seen = Arc::new(AtomicUsize::new(usize::MAX));
        let s = seen.clone();
        let init = move |index: usize| {
            s.store(index, Ordering::SeqCst);
        };
        InitPolicy::init(&init, 7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);

        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        let invoke = move |task: BoxTask| {
            r.fetch_add(1, Ordering::SeqCst);
            task.run();
        };
        invoke.invoke(Box::new(|| {}) as BoxTask);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn move_only_payloads_are_tasks() {
        struct MoveOnly(String);

        let payload = MoveOnly("owned".to_string());
        let task = move || {
            let MoveOnly(s) = payload;
            assert_eq!(s, "owned");
        };
        task.run();
    }
}
