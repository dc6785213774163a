use std::sync::{Condvar, Mutex};

/// A shared LIFO work queue that knows when all work is finished
///
/// A job is "live" from the moment it is pushed until the [`JobGuard`] that
/// popped it is dropped, so jobs may push further jobs while they run.
/// [`JobStack::iter()`] blocks while the queue is empty but live jobs
/// remain, and ends once no job is live (or the stack was shut down).
#[derive(Debug)]
pub(crate) struct JobStack<T> {
    data: Mutex<JobStackData<T>>,
    cond: Condvar,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct JobStackData<T> {
    queue: Vec<T>,
    live: usize,
    shutdown: bool,
}

impl<T> JobStack<T> {
    pub(crate) fn new<I: IntoIterator<Item = T>>(items: I) -> Self {
        let queue: Vec<T> = items.into_iter().collect();
        let live = queue.len();
        JobStack {
            data: Mutex::new(JobStackData {
                queue,
                live,
                shutdown: false,
            }),
            cond: Condvar::new(),
        }
    }

    pub(crate) fn extend<I: IntoIterator<Item = T>>(&self, iter: I) {
        let mut data = self
            .data
            .lock()
            .expect("Mutex should not have been poisoned");
        if !data.shutdown {
            let prelen = data.queue.len();
            data.queue.extend(iter);
            data.live += data.queue.len() - prelen;
            self.cond.notify_all();
        }
    }

    /// Discard all queued jobs and wake every waiter; future pops return
    /// `None`
    pub(crate) fn shutdown(&self) {
        let mut data = self
            .data
            .lock()
            .expect("Mutex should not have been poisoned");
        if !data.shutdown {
            data.live -= data.queue.len();
            data.queue.clear();
            data.shutdown = true;
            self.cond.notify_all();
        }
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.data
            .lock()
            .expect("Mutex should not have been poisoned")
            .shutdown
    }

    pub(crate) fn iter(&self) -> JobIter<'_, T> {
        JobIter { stack: self }
    }

    fn pop(&self) -> Option<T> {
        let mut data = self
            .data
            .lock()
            .expect("Mutex should not have been poisoned");
        loop {
            if data.live == 0 || data.shutdown {
                return None;
            }
            if let value @ Some(_) = data.queue.pop() {
                return value;
            }
            data = self
                .cond
                .wait(data)
                .expect("Mutex should not have been poisoned");
        }
    }

    fn job_done(&self) {
        let mut data = self
            .data
            .lock()
            .expect("Mutex should not have been poisoned");
        data.live -= 1;
        if data.live == 0 {
            self.cond.notify_all();
        }
    }
}

/// Blocking iterator over a [`JobStack`]'s jobs
pub(crate) struct JobIter<'a, T> {
    stack: &'a JobStack<T>,
}

impl<'a, T> Iterator for JobIter<'a, T> {
    type Item = JobGuard<'a, T>;

    fn next(&mut self) -> Option<JobGuard<'a, T>> {
        self.stack.pop().map(|value| JobGuard {
            stack: self.stack,
            value,
        })
    }
}

/// A popped job; dropping it marks the job as finished
pub(crate) struct JobGuard<'a, T> {
    stack: &'a JobStack<T>,
    value: T,
}

impl<T> std::ops::Deref for JobGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for JobGuard<'_, T> {
    fn drop(&mut self) {
        self.stack.job_done();
    }
}
