//! Keyed stats report collections, as sampled from a peer connection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::report_fields;

/// One report: flat field name to scalar value.
pub type StatsReport = BTreeMap<String, Value>;

/// Report id to report, plus the derived top-level timestamp of a delta.
///
/// Serializes flat, the way the server expects a sample:
/// `{"RTCPeerConnection": {...}, "RTCTransport_0": {...}, "timestamp": 1700000000000}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(flatten)]
    pub reports: BTreeMap<String, StatsReport>,
}

impl StatsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(id, report)` pairs.
    pub fn from_reports<I>(reports: I) -> Self
    where
        I: IntoIterator<Item = (String, StatsReport)>,
    {
        Self {
            timestamp: None,
            reports: reports.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, report: StatsReport) {
        self.reports.insert(id.into(), report);
    }

    pub fn get(&self, id: &str) -> Option<&StatsReport> {
        self.reports.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.reports.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Total number of report fields, the size measure of a delta.
    pub fn field_count(&self) -> usize {
        self.reports.values().map(BTreeMap::len).sum()
    }

    /// Timestamp of a single report as a number, if it has one.
    pub fn report_timestamp(report: &StatsReport) -> Option<f64> {
        report.get(report_fields::TIMESTAMP).and_then(Value::as_f64)
    }
}
