//! Seams for the outside world: sockets, timers, and wall-clock time.

pub mod clock;
pub mod scheduler;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use scheduler::{Scheduler, TimerId, TimerKind};
pub use transport::{Transport, TransportFactory};
