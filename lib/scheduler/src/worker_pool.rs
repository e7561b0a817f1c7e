//! The custom worker-pool scheduler: `N` CPU-pinned worker threads, each
//! owning a bounded FIFO task queue, plus a process-wide pending-task
//! counter that lets a producer block until every submitted task has run.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::error::HarnessError;

/// Per-worker FIFO capacity. Exceeding it is a programming error, not a
/// condition the scheduler back-pressures against.
pub const WORK_QUEUE: usize = 1024;

/// Route a task to any worker, via the scheduler's round-robin cursor.
pub const ANY: usize = usize::MAX;

type Job = Box<dyn FnOnce(usize) + Send>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum StopState {
    Running,
    StopRequested,
    Stopped,
}

struct Queue {
    jobs: VecDeque<Job>,
    stop: StopState,
}

struct WorkerState {
    queue: Mutex<Queue>,
    cond: Condvar,
}

/// A pool of CPU-pinned worker threads, each with its own bounded task
/// queue. Construct with [`WorkerPool::new`], submit work with
/// [`WorkerPool::submit`], wait for drainage with [`WorkerPool::task_wait`],
/// and shut down with [`WorkerPool::finalize`].
pub struct WorkerPool {
    workers: Vec<Arc<WorkerState>>,
    handles: Vec<std::thread::JoinHandle<()>>,
    pending: Arc<(Mutex<usize>, Condvar)>,
    cursor: AtomicUsize,
}

impl WorkerPool {
    /// Spawn `num_workers` threads, pinning worker `i` to logical core
    /// `i mod num_cores` on a best-effort basis (pinning failures are
    /// logged as [`log::Level::Warn`] and do not abort).
    pub fn new(num_workers: usize) -> Result<Self, HarnessError> {
        if num_workers == 0 {
            return Err(HarnessError::config("worker pool requires at least one worker"));
        }

        let core_ids = core_affinity::get_core_ids().unwrap_or_default();
        let pending = Arc::new((Mutex::new(0usize), Condvar::new()));

        let mut workers = Vec::with_capacity(num_workers);
        let mut handles = Vec::with_capacity(num_workers);

        for id in 0..num_workers {
            let state = Arc::new(WorkerState {
                queue: Mutex::new(Queue {
                    jobs: VecDeque::with_capacity(WORK_QUEUE),
                    stop: StopState::Running,
                }),
                cond: Condvar::new(),
            });

            let worker_state = state.clone();
            let pending = pending.clone();
            let pin_to = if core_ids.is_empty() {
                None
            } else {
                Some(core_ids[id % core_ids.len()])
            };

            let handle = std::thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || {
                    if let Some(core) = pin_to {
                        if !core_affinity::set_for_current(core) {
                            log::warn!("worker {id}: failed to pin to {core:?}");
                        }
                    }
                    worker_loop(id, worker_state, pending);
                })
                .map_err(|e| HarnessError::resource(format!("spawn worker {id}: {e}")))?;

            workers.push(state);
            handles.push(handle);
        }

        Ok(Self {
            workers,
            handles,
            pending,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Submit a task bound to worker `cpu`, or routed round-robin when
    /// `cpu == ANY`.
    pub fn submit(&self, cpu: usize, job: impl FnOnce(usize) + Send + 'static) {
        let cpu = if cpu == ANY {
            self.cursor.fetch_add(1, Ordering::Relaxed) % self.workers.len()
        } else {
            cpu
        };

        {
            let (lock, _) = &*self.pending;
            *lock.lock().unwrap() += 1;
        }

        let worker = &self.workers[cpu];
        let mut queue = worker.queue.lock().unwrap();
        assert!(
            queue.jobs.len() < WORK_QUEUE,
            "worker {cpu} task queue overflowed capacity {WORK_QUEUE}"
        );
        queue.jobs.push_back(Box::new(job));
        worker.cond.notify_one();
    }

    /// Block until every submitted task has run and the pending counter
    /// reaches zero.
    pub fn task_wait(&self) {
        let (lock, cond) = &*self.pending;
        let mut pending = lock.lock().unwrap();
        while *pending > 0 {
            pending = cond.wait(pending).unwrap();
        }
    }

    /// Request every worker to stop once its queue drains, then join all
    /// threads.
    pub fn finalize(mut self) {
        for worker in &self.workers {
            {
                let mut queue = worker.queue.lock().unwrap();
                queue.stop = StopState::StopRequested;
            }
            worker.cond.notify_one();
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(_id: usize, state: Arc<WorkerState>, pending: Arc<(Mutex<usize>, Condvar)>) {
    loop {
        let job = {
            let mut queue = state.queue.lock().unwrap();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    break Some(job);
                }
                if queue.stop == StopState::StopRequested {
                    queue.stop = StopState::Stopped;
                    break None;
                }
                queue = state.cond.wait(queue).unwrap();
            }
        };

        let Some(job) = job else { return };

        job(_id);

        let (lock, cond) = &*pending;
        let mut count = lock.lock().unwrap();
        *count -= 1;
        if *count == 0 {
            cond.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    #[test]
    fn task_accounting() {
        let pool = WorkerPool::new(4).unwrap();
        let counters: Vec<Arc<StdAtomicUsize>> =
            (0..4).map(|_| Arc::new(StdAtomicUsize::new(0))).collect();

        for _ in 0..100 {
            let counters = counters.clone();
            pool.submit(ANY, move |worker_id| {
                counters[worker_id].fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.task_wait();

        let total: usize = counters.iter().map(|c| c.load(Ordering::SeqCst)).sum();
        assert_eq!(total, 100);
        assert_eq!(counters.iter().filter(|c| c.load(Ordering::SeqCst) == 25).count(), 4);

        pool.finalize();
    }

    #[test]
    fn submit_to_specific_worker() {
        let pool = WorkerPool::new(2).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..5 {
            let seen = seen.clone();
            pool.submit(0, move |id| seen.lock().unwrap().push(id));
        }
        pool.task_wait();
        assert!(seen.lock().unwrap().iter().all(|&id| id == 0));
        pool.finalize();
    }
}
