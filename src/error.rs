use std::io;
use thiserror::Error;

/// Errors related to pool construction.
///
/// Submission (`enqueue`) and teardown (`Drop`) are infallible; the only
/// runtime failure the pool itself can report is a worker thread that could
/// not be spawned. Misuse of the policy traits is rejected at compile time.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Failed to spawn worker thread {index}: {source}")]
    ThreadSpawn {
        index: usize,
        #[source]
        source: io::Error,
    },
}
