use crossbeam_utils::thread;

/// Provides a thread count and a way to jumpstart worker threads.
///
/// Callers do their own load balancing inside the worker body; all the dispatcher needs to do is start
/// `min(thread_count, maximum_worker_count)` workers and block until every one of them returns.
pub trait IThreadDispatcher: Send + Sync {
    /// Gets the number of workers available in the thread dispatcher.
    fn thread_count(&self) -> usize;

    /// Dispatches workers and waits for all of them to finish.
    ///
    /// # Arguments
    ///
    /// * `worker_body` - Invoked once per worker with the worker's index.
    /// * `maximum_worker_count` - Maximum number of workers to dispatch.
    fn dispatch_workers<F>(&self, worker_body: F, maximum_worker_count: usize)
    where
        F: Fn(usize) + Sync;
}

/// Dispatcher that spawns scoped threads for each dispatch.
#[derive(Clone, Copy, Debug)]
pub struct ScopedThreadDispatcher {
    thread_count: usize,
}

impl ScopedThreadDispatcher {
    /// Creates a dispatcher with the given number of workers. At least one worker is always used.
    pub fn new(thread_count: usize) -> Self {
        Self {
            thread_count: thread_count.max(1),
        }
    }

    /// Creates a dispatcher with one worker per available hardware thread.
    pub fn with_available_parallelism() -> Self {
        Self::new(std::thread::available_parallelism().map_or(1, |count| count.get()))
    }
}

impl IThreadDispatcher for ScopedThreadDispatcher {
    #[inline]
    fn thread_count(&self) -> usize {
        self.thread_count
    }

    fn dispatch_workers<F>(&self, worker_body: F, maximum_worker_count: usize)
    where
        F: Fn(usize) + Sync,
    {
        let worker_count = self.thread_count.min(maximum_worker_count);
        if worker_count == 0 {
            return;
        }
        if worker_count == 1 {
            // No point paying for a thread spawn.
            worker_body(0);
            return;
        }
        let worker_body = &worker_body;
        let result = thread::scope(|scope| {
            for worker_index in 1..worker_count {
                scope.spawn(move |_| worker_body(worker_index));
            }
            worker_body(0);
        });
        if let Err(panic) = result {
            std::panic::resume_unwind(panic);
        }
    }
}
