use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// An owned, cancellable timer backed by a tokio task.
///
/// At most one task is pending per `Timer`: arming again replaces the pending
/// task instead of stacking a second one.
#[derive(Default)]
pub struct Timer {
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Arms a one-shot timer that runs `on_fire` after `delay`
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            on_fire.await;
        }));
    }

    /// Arms a repeating timer. The first tick happens one period from now and
    /// the timer stops once `on_tick` resolves to `false`.
    pub fn arm_interval<F, Fut>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.cancel();
        let period = period.max(MIN_PERIOD);
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if !on_tick().await {
                    break;
                }
            }
        }));
    }

    /// Aborts the pending task, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Forgets the task without aborting it; used by a task that is firing.
    pub fn disarm(&mut self) {
        self.handle = None;
    }

    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}
