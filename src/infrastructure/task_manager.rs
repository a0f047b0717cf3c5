use std::time::Duration;
use tokio::task::JoinHandle;

/// Tracks the tasks backing one socket session
pub struct TaskManager {
    handles: Vec<JoinHandle<()>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Spawn a task and track it
    pub fn spawn<F>(&mut self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.push(tokio::spawn(future));
    }

    pub fn is_empty(&self) -> bool {
        self.handles.iter().all(|handle| handle.is_finished())
    }

    /// Lets the tasks run for `grace` (e.g. to flush a close frame), then
    /// aborts whatever is still alive.
    pub async fn shutdown_after(self, grace: Duration) {
        let deadline = tokio::time::Instant::now() + grace;
        for handle in self.handles {
            let abort = handle.abort_handle();
            if tokio::time::timeout_at(deadline, handle).await.is_err() {
                abort.abort();
            }
        }
    }

    /// Abort all tasks without waiting
    pub fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}
