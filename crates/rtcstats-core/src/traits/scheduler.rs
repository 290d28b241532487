use std::fmt;
use std::time::Duration;

/// Identifies one armed timer. Ids are never reused by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Fires every `delay` until cancelled.
    Keepalive,
    /// Fires once after `delay`.
    Reconnect,
    /// Fires once after `delay` if a requested close is still unconfirmed.
    CloseDeadline,
}

/// Arms and cancels timers on behalf of the connection controller.
///
/// Firing is reported back through the owner's `handle_timer(id)`; a
/// scheduler never calls into the controller itself.
pub trait Scheduler: Send {
    fn arm(&mut self, id: TimerId, kind: TimerKind, delay: Duration);
    fn cancel(&mut self, id: TimerId);
}
