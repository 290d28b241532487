//! Per-peer-connection delta state.

use std::collections::HashMap;

use rtcstats_core::models::StatsSnapshot;

use crate::delta::diff;

/// Keeps the last full snapshot of every peer connection and turns each new
/// sample into a delta against it. Never holds more than one snapshot per id.
#[derive(Debug, Default)]
pub struct DeltaCompressor {
    previous: HashMap<String, StatsSnapshot>,
}

impl DeltaCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress `current` against the last sample of `pc_id` and remember it
    /// as the new baseline. The first sample of an id is shipped in full.
    pub fn compress(&mut self, pc_id: &str, current: StatsSnapshot) -> StatsSnapshot {
        let delta = match self.previous.get(pc_id) {
            Some(previous) => diff(previous, &current),
            None => diff(&StatsSnapshot::new(), &current),
        };
        self.previous.insert(pc_id.to_string(), current);
        delta
    }

    /// Drop the baseline of a closed peer connection.
    pub fn forget(&mut self, pc_id: &str) -> bool {
        self.previous.remove(pc_id).is_some()
    }

    /// Number of peer connections with a baseline.
    pub fn tracked(&self) -> usize {
        self.previous.len()
    }
}
