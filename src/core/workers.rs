//! Background thread pool for persistence calls.
//!
//! Store requests are blocking (reqwest::blocking), so they never run on the UI
//! thread. Jobs go through the [`JobRunner`] seam: the app uses [`Workers`],
//! tests use [`InlineRunner`] to run the same jobs synchronously.
//!
//! Uses work-stealing deques:
//! - New jobs pushed to the global injector
//! - Idle workers steal from each other
//! - No lock contention between workers

use crossbeam::deque::{Injector, Worker};
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a job, now or later.
pub trait JobRunner: Send + Sync {
    fn run(&self, job: Job);
}

/// Runs every job on the caller's thread before returning.
#[derive(Default, Debug, Clone, Copy)]
pub struct InlineRunner;

impl JobRunner for InlineRunner {
    fn run(&self, job: Job) {
        job();
    }
}

/// Worker pool with work-stealing.
///
/// # Example
/// ```ignore
/// let workers = Workers::new(2);
/// let store = Arc::clone(&store);
/// workers.execute(move || {
///     if let Err(e) = store.delete(&id) {
///         log::error!("Delete failed: {}", e);
///     }
/// });
/// ```
pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    /// Jobs queued or running, for the status bar busy indicator
    in_flight: Arc<AtomicUsize>,
}

impl Workers {
    /// Create pool. Persistence is I/O bound and ordered per item by the
    /// pipeline, so a small count (1-4) is plenty.
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut workers_local: Vec<Worker<Job>> = Vec::new();
        let mut stealers = Vec::new();
        let mut handles = Vec::new();

        for _ in 0..num_threads {
            let worker: Worker<Job> = Worker::new_fifo();
            stealers.push(worker.stealer());
            workers_local.push(worker);
        }

        for (worker_id, worker) in workers_local.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let spawned = thread::Builder::new()
                .name(format!("cueline-worker-{}", worker_id))
                .spawn(move || {
                    trace!("Worker {} started", worker_id);

                    loop {
                        if let Some(job) = worker.pop() {
                            job();
                            continue;
                        }

                        if let Some(job) = injector.steal().success() {
                            job();
                            continue;
                        }

                        let stolen = stealers.iter().find_map(|s| s.steal().success());
                        if let Some(job) = stolen {
                            job();
                            continue;
                        }

                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }

                        // Idle: sleep instead of spinning
                        thread::sleep(std::time::Duration::from_millis(2));
                    }

                    trace!("Worker {} stopped", worker_id);
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => log::error!("Failed to spawn worker {}: {}", worker_id, e),
            }
        }

        trace!("Workers initialized: {} threads", handles.len());

        Self {
            injector,
            handles,
            shutdown,
            in_flight,
        }
    }

    /// Queue a closure for a worker thread. No return value; report results
    /// through a channel.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);
        self.injector.push(Box::new(move || {
            f();
            in_flight.fetch_sub(1, Ordering::SeqCst);
        }));
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn num_threads(&self) -> usize {
        self.handles.len()
    }
}

impl JobRunner for Workers {
    fn run(&self, job: Job) {
        if self.handles.is_empty() {
            // No thread could be spawned; degrade to synchronous
            job();
            return;
        }
        self.execute(job);
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        use std::time::{Duration, Instant};

        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);

        self.shutdown.store(true, Ordering::SeqCst);

        // Give queued writes a chance to land; don't hang exit on a dead server
        let deadline = Instant::now() + Duration::from_millis(1500);

        let handles = std::mem::take(&mut self.handles);
        for handle in handles {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, exiting anyway");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {} workers stopped", num_threads);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_inline_runner_is_synchronous() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        InlineRunner.run(Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_workers_run_jobs() {
        let workers = Workers::new(2);
        let (tx, rx) = crossbeam_channel::unbounded();
        for i in 0..10 {
            let tx = tx.clone();
            workers.run(Box::new(move || {
                let _ = tx.send(i);
            }));
        }
        let mut got: Vec<i32> = (0..10)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        got.sort();
        assert_eq!(got, (0..10).collect::<Vec<_>>());

        let deadline = Instant::now() + Duration::from_secs(5);
        while workers.in_flight() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(workers.in_flight(), 0);
    }
}
