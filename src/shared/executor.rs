// This is free and unencumbered software released into the public domain.

use std::sync::{
    Mutex,
    mpsc::{Receiver, Sender, TryRecvError, channel},
};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Schedules work onto the host's UI thread.
///
/// Every result completion and channel message the bridge produces goes
/// through here, whichever thread the native view reported from.
pub trait UiExecutor: Send + Sync {
    fn execute(&self, task: Task);
}

/// Runs each task immediately on the calling thread.
///
/// Suitable when the host already delivers every callback on its UI thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl UiExecutor for InlineExecutor {
    fn execute(&self, task: Task) {
        task()
    }
}

/// Queues tasks until the UI thread drains them with [`run_pending`].
///
/// [`run_pending`]: QueuedExecutor::run_pending
#[derive(Debug)]
pub struct QueuedExecutor {
    tx: Sender<Task>,
    rx: Mutex<Receiver<Task>>,
}

impl Default for QueuedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueuedExecutor {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Runs every queued task, including tasks queued by the tasks
    /// themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        loop {
            // Release the lock before running so tasks may enqueue more work.
            let next = {
                let rx = self.rx.lock().unwrap_or_else(|p| p.into_inner());
                rx.try_recv()
            };
            match next {
                Ok(task) => {
                    task();
                    count += 1;
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return count,
            }
        }
    }
}

impl UiExecutor for QueuedExecutor {
    fn execute(&self, task: Task) {
        // The receiver lives as long as `self`, so this cannot fail.
        let _ = self.tx.send(task);
    }
}
