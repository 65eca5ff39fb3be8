//! Bounded worker pool with handle-based submission.
//!
//! Jobs go through an unbounded crossbeam channel to a fixed set of named worker
//! threads. Each submission returns a [`TaskHandle`] that resolves to the job's
//! result; panics are caught on the worker and reported as
//! [`Error::TaskPanicked`], so a failing job never takes a worker or its siblings
//! down. Workers are detached: [`WorkerPool::shutdown`] waits up to the grace
//! period for the queue to drain, then cancels whatever is still queued.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, info, warn};

use crate::config::{clamp_worker_threads, EngineConfig, DEFAULT_SHUTDOWN_GRACE};
use crate::error::{Error, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pending result of a submitted job.
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T>>,
}

impl<T> TaskHandle<T> {
    fn ready(result: Result<T>) -> Self {
        let (sender, receiver) = bounded(1);
        let _ = sender.send(result);
        Self { receiver }
    }

    /// Blocks until the job finishes. A job dropped at shutdown yields [`Error::TaskCancelled`].
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().unwrap_or(Err(Error::TaskCancelled))
    }

    /// Waits at most `timeout`; `None` when the job is still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(Error::TaskCancelled)),
        }
    }

    /// Non-blocking poll.
    pub fn try_take(&self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::TaskCancelled)),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Fixed-size set of background worker threads.
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Job>>>,
    queue: Receiver<Job>,
    done: Receiver<()>,
    workers: usize,
    grace: Duration,
    in_flight: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
    shut_down: AtomicBool,
}

impl WorkerPool {
    /// Spawns `threads` workers, clamped to `[1, 16]`.
    pub fn new(threads: usize) -> Result<Self> {
        Self::with_grace(threads, DEFAULT_SHUTDOWN_GRACE)
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::with_grace(config.effective_threads(), config.shutdown_grace)
    }

    pub fn with_grace(threads: usize, grace: Duration) -> Result<Self> {
        let workers = clamp_worker_threads(threads);
        let (sender, queue) = unbounded::<Job>();
        let (done_sender, done) = unbounded::<()>();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicBool::new(false));

        for index in 0..workers {
            let receiver = queue.clone();
            let done_sender = done_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let cancelled = Arc::clone(&cancelled);

            std::thread::Builder::new()
                .name(format!("tree-gen-worker-{index}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        if !cancelled.load(Ordering::Acquire) {
                            job();
                        }
                        in_flight.fetch_sub(1, Ordering::AcqRel);
                    }
                    let _ = done_sender.send(());
                })?;
        }

        info!("Started worker pool with {} threads.", workers);
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            queue,
            done,
            workers,
            grace,
            in_flight,
            cancelled,
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Jobs queued or running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Queues `task` and returns a handle to its result.
    ///
    /// After shutdown the handle resolves immediately to [`Error::PoolShutdown`].
    pub fn submit<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (reply, receiver) = bounded(1);
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|payload| {
                Err(Error::TaskPanicked(panic_message(payload.as_ref())))
            });
            let _ = reply.send(result);
        });

        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            return TaskHandle::ready(Err(Error::PoolShutdown));
        };
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        if sender.send(job).is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return TaskHandle::ready(Err(Error::PoolShutdown));
        }
        TaskHandle { receiver }
    }

    /// Stops accepting work, waits up to the grace period, then cancels queued jobs.
    ///
    /// Running jobs are never interrupted; their threads are left to finish on their own.
    /// Calling this more than once has no further effect.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let deadline = Instant::now() + self.grace;
        let mut finished = 0;
        while finished < self.workers {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.done.recv_timeout(remaining) {
                Ok(()) => finished += 1,
                Err(_) => break,
            }
        }
        if finished == self.workers {
            debug!("Worker pool drained cleanly.");
            return;
        }

        self.cancelled.store(true, Ordering::Release);
        let mut dropped = 0;
        while let Ok(job) = self.queue.try_recv() {
            drop(job);
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            dropped += 1;
        }
        warn!(
            "Worker pool did not drain within {:?}; cancelled {} queued tasks, {} workers still busy.",
            self.grace,
            dropped,
            self.workers - finished
        );
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn worker_count_is_clamped() {
        assert_eq!(WorkerPool::new(0).unwrap().worker_count(), 1);
        assert_eq!(WorkerPool::new(40).unwrap().worker_count(), 16);
    }

    #[test]
    fn results_come_back_through_handles() {
        let pool = WorkerPool::new(2).unwrap();
        let handles: Vec<_> = (0..10).map(|i| pool.submit(move || Ok(i * 2))).collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.wait().unwrap()).collect();
        assert_eq!(results, (0..10).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn errors_and_panics_are_captured() {
        let pool = WorkerPool::new(1).unwrap();
        let failing = pool.submit(|| -> Result<()> { Err(Error::Other("boom".into())) });
        let panicking = pool.submit(|| -> Result<()> { panic!("kaboom") });
        let fine = pool.submit(|| Ok(5));

        assert!(matches!(failing.wait(), Err(Error::Other(_))));
        match panicking.wait() {
            Err(Error::TaskPanicked(message)) => assert!(message.contains("kaboom")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(fine.wait().unwrap(), 5);
    }

    #[test]
    fn never_more_running_than_workers() {
        let pool = WorkerPool::new(3).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..24)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                pool.submit(move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();
        for handle in handles {
            handle.wait().unwrap();
        }

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {peak}");
        assert!(peak >= 1);
    }

    #[test]
    fn shutdown_is_idempotent_and_rejects_new_work() {
        let pool = WorkerPool::new(2).unwrap();
        let handle = pool.submit(|| Ok("done"));
        pool.shutdown();
        pool.shutdown();

        assert_eq!(handle.wait().unwrap(), "done");
        assert!(pool.is_shut_down());
        assert!(matches!(pool.submit(|| Ok(1)).wait(), Err(Error::PoolShutdown)));
    }

    #[test]
    fn shutdown_cancels_queued_work_after_grace() {
        let pool = WorkerPool::with_grace(1, Duration::from_millis(50)).unwrap();
        let (started, started_rx) = bounded(1);
        let slow = pool.submit(move || {
            let _ = started.send(());
            thread::sleep(Duration::from_millis(300));
            Ok(1)
        });
        let queued = pool.submit(|| Ok(2));

        started_rx.recv().unwrap();
        pool.shutdown();

        assert!(matches!(queued.wait(), Err(Error::TaskCancelled)));
        assert_eq!(slow.wait().unwrap(), 1);
    }
}
