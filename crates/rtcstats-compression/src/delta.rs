//! Delta computation between two successive stats snapshots, and its inverse.

use serde_json::Value;

use rtcstats_core::constants::report_fields::{ID, TIMESTAMP};
use rtcstats_core::models::{StatsReport, StatsSnapshot};

/// Compute the delta that turns `previous` into `current`.
///
/// - `id` is dropped from every report (it repeats the key).
/// - Reports missing from `previous` are shipped whole.
/// - Fields equal to their previous value are dropped (numbers compare by
///   value, so `1` and `1.0` are equal); a known report left
///   with nothing, or with only its timestamp, is dropped.
/// - The newest timestamp among retained reports moves to the top level and
///   every report carrying exactly that timestamp gets `0` instead.
///
/// Reports that disappeared between the two samples are not represented.
pub fn diff(previous: &StatsSnapshot, current: &StatsSnapshot) -> StatsSnapshot {
    let mut delta = StatsSnapshot::new();

    for (id, report) in &current.reports {
        let mut pruned = report.clone();
        pruned.remove(ID);

        let Some(old) = previous.get(id) else {
            delta.insert(id.clone(), pruned);
            continue;
        };

        pruned.retain(|name, value| !old.get(name).is_some_and(|prev| same_value(prev, value)));
        if is_clock_only(&pruned) {
            continue;
        }
        delta.insert(id.clone(), pruned);
    }

    let newest = delta
        .reports
        .values()
        .filter_map(|report| report.get(TIMESTAMP))
        .filter(|ts| ts.as_f64().is_some())
        .max_by(|a, b| compare_numbers(a, b))
        .cloned();

    if let Some(newest) = newest {
        let newest_f = newest.as_f64();
        for report in delta.reports.values_mut() {
            if let Some(ts) = report.get_mut(TIMESTAMP) {
                if ts.as_f64() == newest_f {
                    *ts = Value::from(0);
                }
            }
        }
        delta.timestamp = Some(newest);
    }

    tracing::trace!(
        reports_in = current.len(),
        reports_out = delta.len(),
        fields_in = current.field_count(),
        fields_out = delta.field_count(),
        "stats delta computed"
    );
    delta
}

/// Rebuild the full snapshot from the previous one and a delta.
///
/// Inverse of [`diff`] for every field except the timestamps of reports whose
/// only change was their clock (those keep the previous timestamp). A number
/// that only changed representation keeps its previous form.
pub fn apply_delta(previous: &StatsSnapshot, delta: &StatsSnapshot) -> StatsSnapshot {
    let mut rebuilt = StatsSnapshot::from_reports(previous.reports.clone());

    for (id, changes) in &delta.reports {
        let report = rebuilt.reports.entry(id.clone()).or_default();
        for (name, value) in changes {
            report.insert(name.clone(), value.clone());
        }
        report.insert(ID.to_string(), Value::String(id.clone()));

        if let (Some(ts), Some(newest)) = (report.get_mut(TIMESTAMP), &delta.timestamp) {
            if ts.as_f64() == Some(0.0) {
                *ts = newest.clone();
            }
        }
    }

    rebuilt
}

fn is_clock_only(report: &StatsReport) -> bool {
    report.is_empty() || (report.len() == 1 && report.contains_key(TIMESTAMP))
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare_numbers(a: &Value, b: &Value) -> std::cmp::Ordering {
    let a = a.as_f64().unwrap_or(f64::NEG_INFINITY);
    let b = b.as_f64().unwrap_or(f64::NEG_INFINITY);
    a.total_cmp(&b)
}
