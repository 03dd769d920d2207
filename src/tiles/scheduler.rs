//! Delayed execution of tile production jobs

use crate::traits::{ProductionJob, ProductionScheduler};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Runs each job on its own detached thread after sleeping for the delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl ProductionScheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, job: ProductionJob) {
        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            job();
        });
    }
}

/// Spawns `sleep(delay); job()` on the async runtime of the calling thread.
///
/// Falls back to [`ThreadScheduler`] when called outside a runtime, so a
/// producer keeps working from plain threads.
#[cfg(feature = "tokio-runtime")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeScheduler;

#[cfg(feature = "tokio-runtime")]
impl ProductionScheduler for RuntimeScheduler {
    fn schedule(&self, delay: Duration, job: ProductionJob) {
        if !crate::runtime::is_available() {
            log::trace!("no async runtime on this thread, scheduling on a worker thread");
            ThreadScheduler.schedule(delay, job);
            return;
        }

        crate::runtime::spawn(async move {
            crate::runtime::async_delay(delay).await;
            job();
        });
    }
}

/// Scheduler used when none is given explicitly
pub fn default_scheduler() -> Arc<dyn ProductionScheduler> {
    #[cfg(feature = "tokio-runtime")]
    {
        Arc::new(RuntimeScheduler)
    }

    #[cfg(not(feature = "tokio-runtime"))]
    {
        Arc::new(ThreadScheduler)
    }
}

struct QueuedJob {
    delay: Duration,
    sequence: u64,
    job: ProductionJob,
}

#[derive(Default)]
struct ManualQueue {
    jobs: Vec<QueuedJob>,
    next_sequence: u64,
}

/// Holds jobs until the owner runs them explicitly.
///
/// Jobs run in order of their requested delay (ties in submission order),
/// which models the timer firing order without any real waiting. Used by
/// tests and by hosts that drive production from their own clock.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Arc<Mutex<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting to run
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).jobs.len()
    }

    /// Run the job that would fire first; returns `false` if none was queued
    pub fn run_next(&self) -> bool {
        // The lock is released before the job runs; jobs may schedule more work.
        let next = {
            let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
            let index = queue
                .jobs
                .iter()
                .enumerate()
                .min_by_key(|(_, queued)| (queued.delay, queued.sequence))
                .map(|(index, _)| index);
            index.map(|index| queue.jobs.remove(index))
        };

        match next {
            Some(queued) => {
                (queued.job)();
                true
            }
            None => false,
        }
    }

    /// Run every queued job, including jobs queued while running; returns how many ran
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl ProductionScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, job: ProductionJob) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = queue.next_sequence;
        queue.next_sequence += 1;
        queue.jobs.push(QueuedJob { delay, sequence, job });
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
