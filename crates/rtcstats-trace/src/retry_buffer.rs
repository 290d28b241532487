//! Bounded, ordered store of envelopes the server has not acknowledged yet.

use std::collections::VecDeque;

use rtcstats_core::errors::ProtocolError;
use rtcstats_core::models::{Envelope, Session};

/// Unacknowledged envelopes in append order.
///
/// When full, new envelopes are dropped and the oldest are kept: the server
/// needs the early stats samples as the baseline for delta decompression,
/// and its gap detection relies on an unbroken prefix.
#[derive(Debug)]
pub struct RetryBuffer {
    entries: VecDeque<Envelope>,
    capacity: usize,
    /// Highest sequence number ever appended.
    horizon: Option<u64>,
    dropped: u64,
}

impl RetryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            horizon: None,
            dropped: 0,
        }
    }

    /// Add an envelope to the tail. Returns `false` (and counts a drop) if
    /// the buffer is full.
    pub fn append(&mut self, envelope: Envelope) -> bool {
        if self.is_full() {
            self.dropped += 1;
            return false;
        }
        let seq = envelope.sequence_number();
        debug_assert!(
            self.horizon.map_or(true, |h| seq > h),
            "envelopes must be appended in sequence order"
        );
        self.horizon = Some(seq);
        self.entries.push_back(envelope);
        true
    }

    /// Count an envelope that was refused before it reached `append`.
    pub fn record_drop(&mut self) {
        self.dropped += 1;
    }

    /// Remove every envelope with a sequence number `<= acked`.
    ///
    /// Fails with [`ProtocolError::SequenceGap`] if `acked` falls outside
    /// `[first - 1, last]`, or differs from the last appended number (0 if
    /// none) when the buffer is empty. The buffer is left untouched on failure.
    pub fn prune_up_to(&mut self, acked: u64) -> Result<usize, ProtocolError> {
        let (low, high, first) = match (self.entries.front(), self.entries.back()) {
            (Some(first), Some(last)) => (
                first.sequence_number().saturating_sub(1),
                last.sequence_number(),
                first.sequence_number(),
            ),
            _ => {
                let horizon = self.horizon.unwrap_or(0);
                (horizon, horizon, horizon)
            }
        };
        if acked < low || acked > high {
            return Err(ProtocolError::SequenceGap {
                acked,
                first,
                last: high,
            });
        }

        let before = self.entries.len();
        while self
            .entries
            .front()
            .is_some_and(|e| e.sequence_number() <= acked)
        {
            self.entries.pop_front();
        }
        Ok(before - self.entries.len())
    }

    /// Every remaining envelope in append order, for replay. Nothing is
    /// removed; only [`prune_up_to`](Self::prune_up_to) removes.
    pub fn drain_in_order(&self) -> impl Iterator<Item = &Envelope> + '_ {
        self.entries.iter()
    }

    /// Move envelopes with a sequence number above `sent_through` to
    /// `session`. Returns how many were rewritten.
    pub fn relabel_unsent(&mut self, sent_through: u64, session: &Session) -> usize {
        let mut rewritten = 0;
        for envelope in self
            .entries
            .iter_mut()
            .filter(|e| e.sequence_number() > sent_through)
        {
            envelope.relabel(session);
            rewritten += 1;
        }
        rewritten
    }

    /// Tear the buffer down. Returns how many envelopes were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.entries.len();
        self.entries.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Envelopes refused because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn first_sequence(&self) -> Option<u64> {
        self.entries.front().map(Envelope::sequence_number)
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.entries.back().map(Envelope::sequence_number)
    }
}
