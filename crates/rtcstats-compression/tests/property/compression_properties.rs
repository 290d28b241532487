use proptest::prelude::*;
use rtcstats_compression::{apply_delta, diff};
use rtcstats_core::models::{StatsReport, StatsSnapshot};
use serde_json::{json, Value};

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0u32..4).prop_map(|n| json!(n)),
        prop::sample::select(vec!["new", "checking", "connected"]).prop_map(|s| json!(s)),
        any::<bool>().prop_map(Value::Bool),
    ]
}

fn arb_fields() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec((0usize..5, arb_value()), 0..5).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(i, v)| (format!("f{i}"), v))
            .collect()
    })
}

fn build(ids: &[usize], fields: &[Vec<(String, Value)>], ts: u64) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot::new();
    for (id, fields) in ids.iter().zip(fields) {
        let key = format!("R{id}");
        let mut report = StatsReport::new();
        report.insert("id".into(), json!(key));
        report.insert("timestamp".into(), json!(ts));
        for (name, value) in fields {
            report.insert(name.clone(), value.clone());
        }
        snapshot.insert(key, report);
    }
    snapshot
}

fn arb_snapshot(ts: u64) -> impl Strategy<Value = StatsSnapshot> {
    prop::collection::vec((0usize..6, arb_fields()), 0..6).prop_map(move |reports| {
        let (ids, fields): (Vec<_>, Vec<_>) = reports.into_iter().unzip();
        build(&ids, &fields, ts)
    })
}

fn without_timestamps(snapshot: &StatsSnapshot) -> StatsSnapshot {
    let mut out = snapshot.clone();
    out.timestamp = None;
    for report in out.reports.values_mut() {
        report.remove("timestamp");
    }
    out
}

// ── Identical input compresses to nothing ────────────────────────────────

proptest! {
    #[test]
    fn diff_of_identical_snapshots_is_empty(a in arb_snapshot(1000)) {
        let delta = diff(&a, &a);
        prop_assert!(delta.is_empty());
    }
}

// ── Output never grows ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn delta_is_never_larger_than_input(
        a in arb_snapshot(1000),
        b in arb_snapshot(2000),
    ) {
        let delta = diff(&a, &b);
        prop_assert!(delta.field_count() <= b.field_count());
        prop_assert!(delta.len() <= b.len());
    }
}

// ── One changed field shows up alone ─────────────────────────────────────

proptest! {
    #[test]
    fn one_changed_field_is_the_whole_delta(
        a in arb_snapshot(1000),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!a.is_empty());
        let ids: Vec<String> = a.reports.keys().cloned().collect();
        let target = pick.get(&ids).clone();

        let mut b = a.clone();
        for report in b.reports.values_mut() {
            report.insert("timestamp".into(), json!(2000));
        }
        b.reports.get_mut(&target).unwrap().insert("changed".into(), json!("yes"));

        let delta = diff(&a, &b);
        prop_assert_eq!(delta.len(), 1);
        let only = delta.get(&target).unwrap();
        prop_assert_eq!(only.len(), 2);
        prop_assert_eq!(&only["changed"], &json!("yes"));
        prop_assert_eq!(&only["timestamp"], &json!(0));
        prop_assert_eq!(delta.timestamp, Some(json!(2000)));
    }
}

// ── Delta over previous rebuilds current ─────────────────────────────────

proptest! {
    #[test]
    fn apply_delta_reconstructs_fields(
        a in arb_snapshot(1000),
        extra in arb_snapshot(2000),
    ) {
        // Reports never disappear between samples: deltas cannot express removal.
        let mut b = a.clone();
        for report in b.reports.values_mut() {
            report.insert("timestamp".into(), json!(2000));
        }
        // Fields never disappear either; extra samples only add or overwrite.
        for (id, report) in extra.reports {
            let entry = b.reports.entry(id).or_default();
            for (name, value) in report {
                entry.insert(name, value);
            }
        }

        let rebuilt = apply_delta(&a, &diff(&a, &b));
        prop_assert_eq!(without_timestamps(&rebuilt), without_timestamps(&b));
    }
}
