use std::collections::HashMap;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};

use rtcstats_core::traits::{Scheduler, TimerId, TimerKind};

use super::{DriverEvent, DriverSender};

/// Timers backed by `tokio::time`. Each armed timer is a small task that
/// posts [`DriverEvent::Timer`] back to the driver.
#[derive(Debug)]
pub struct TokioScheduler {
    events: DriverSender,
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    pub(crate) fn new(events: DriverSender) -> Self {
        Self {
            events,
            timers: HashMap::new(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&mut self, id: TimerId, kind: TimerKind, delay: Duration) {
        let events = self.events.clone();
        let task = match kind {
            TimerKind::Keepalive => tokio::spawn(async move {
                let period = delay.max(Duration::from_millis(1));
                let mut ticker = interval_at(Instant::now() + period, period);
                loop {
                    ticker.tick().await;
                    if events.send(DriverEvent::Timer(id)).is_err() {
                        break;
                    }
                }
            }),
            TimerKind::Reconnect | TimerKind::CloseDeadline => tokio::spawn(async move {
                sleep(delay).await;
                let _ = events.send(DriverEvent::Timer(id));
            }),
        };
        if let Some(previous) = self.timers.insert(id, task) {
            previous.abort();
        }
        self.timers.retain(|_, task| !task.is_finished());
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.timers.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}
