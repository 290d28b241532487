use std::time::Duration;

use proptest::prelude::*;
use rtcstats_core::models::{Envelope, EnvelopeDraft, EnvelopePayload, Session, TraceEvent};
use rtcstats_trace::{backoff_delay, RetryBuffer};
use serde_json::json;

fn envelope(seq: u64) -> Envelope {
    let event = TraceEvent::new("event", None, json!(seq));
    let draft = EnvelopeDraft::new(Session::with_id("s"), EnvelopePayload::StatsEntry(event));
    Envelope::stamp(draft, 0, seq)
}

proptest! {
    #[test]
    fn prune_keeps_exactly_the_unacked_suffix(start in 1u64..50, len in 1u64..40, offset in 0u64..41) {
        let last = start + len - 1;
        let acked = (start - 1 + offset).min(last);
        let mut buffer = RetryBuffer::new(100);
        for seq in start..=last {
            buffer.append(envelope(seq));
        }

        let removed = buffer.prune_up_to(acked).unwrap();
        prop_assert_eq!(removed as u64, acked + 1 - start);
        let remaining: Vec<u64> = buffer.drain_in_order().map(Envelope::sequence_number).collect();
        let expected: Vec<u64> = (acked + 1..=last).collect();
        prop_assert_eq!(remaining, expected);
    }

    #[test]
    fn acks_outside_the_range_are_gaps(start in 2u64..50, len in 1u64..40, below in any::<bool>(), distance in 1u64..100) {
        let last = start + len - 1;
        let acked = if below { (start - 1).saturating_sub(distance) } else { last + distance };
        prop_assume!(acked < start - 1 || acked > last);
        let mut buffer = RetryBuffer::new(100);
        for seq in start..=last {
            buffer.append(envelope(seq));
        }
        prop_assert!(buffer.prune_up_to(acked).is_err());
        prop_assert_eq!(buffer.len() as u64, len);
    }

    #[test]
    fn scheduled_delays_never_exceed_the_budget(
        budget_ms in 1u64..1_000_000,
        base_ms in 1u64..5_000,
        jitters in prop::collection::vec(0u64..1_000, 1..40),
    ) {
        let budget = Duration::from_millis(budget_ms);
        let mut scheduled = Duration::ZERO;
        let mut previous = Duration::ZERO;
        for (attempt, jitter) in jitters.iter().enumerate() {
            let remaining = budget.saturating_sub(scheduled);
            if remaining.is_zero() {
                break;
            }
            let jitter = Duration::from_millis(*jitter);
            let delay = backoff_delay(attempt as u32, Duration::from_millis(base_ms), jitter, remaining);
            prop_assert!(delay <= remaining);
            let floor = backoff_delay(attempt as u32, Duration::from_millis(base_ms), Duration::ZERO, remaining);
            prop_assert!(floor >= previous.min(remaining));
            previous = floor;
            scheduled += delay;
        }
        prop_assert!(scheduled <= budget);
    }
}
