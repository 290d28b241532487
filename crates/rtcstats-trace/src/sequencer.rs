//! Sequence number and timestamp assignment.

use std::num::NonZeroU64;
use std::sync::Arc;

use rtcstats_core::constants::INITIAL_SEQUENCE_NUMBER;
use rtcstats_core::models::{Envelope, EnvelopeDraft};
use rtcstats_core::traits::Clock;

/// Stamps each draft with the current wall-clock time and the next sequence
/// number. The counter survives session re-parenting and never hands out 0.
pub struct Sequencer {
    next: NonZeroU64,
    clock: Arc<dyn Clock>,
}

impl Sequencer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let first = NonZeroU64::new(INITIAL_SEQUENCE_NUMBER).unwrap_or(NonZeroU64::MIN);
        Self::starting_at(first, clock)
    }

    pub fn starting_at(first: NonZeroU64, clock: Arc<dyn Clock>) -> Self {
        Self { next: first, clock }
    }

    pub fn next(&mut self, draft: EnvelopeDraft) -> Envelope {
        let sequence_number = self.next.get();
        self.next = self.next.saturating_add(1);
        Envelope::stamp(draft, self.clock.now_ms(), sequence_number)
    }

    /// The number the next envelope will get.
    pub fn peek(&self) -> u64 {
        self.next.get()
    }

    /// The last number handed out, or one below the starting number if none.
    pub fn last_assigned(&self) -> u64 {
        self.next.get() - 1
    }
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer").field("next", &self.next).finish()
    }
}
