use proptest::prelude::*;
use rtcstats_core::config::{ObservabilityConfig, TraceConfig, TransportConfig};
use rtcstats_core::models::{SequenceAck, ServerMessage};
use serde_json::json;

fn arb_transport() -> impl Strategy<Value = TransportConfig> {
    (
        (
            prop::sample::select(vec!["ws", "wss"]),
            "[a-z]{1,12}(\\.[a-z]{2,5})?",
            "/[a-z0-9/_-]{0,16}",
            any::<bool>(),
            "[ -~]{0,24}",
        ),
        (
            1u64..=u32::MAX as u64,
            1usize..=100_000,
            any::<u32>(),
            1u64..=600_000,
            0u64..=10_000,
            1u64..=120_000,
        ),
    )
        .prop_map(
            |((scheme, host, path, use_legacy, user_agent), (ping, buffer, reconnect, base, jitter, close))| {
                TransportConfig {
                    endpoint: format!("{scheme}://{host}"),
                    path,
                    use_legacy,
                    user_agent,
                    ping_interval_ms: ping,
                    buffer_limit: buffer,
                    max_reconnect_time_ms: u64::from(reconnect),
                    backoff_base_ms: base,
                    backoff_jitter_ms: jitter,
                    close_timeout_ms: close,
                }
            },
        )
}

fn arb_observability() -> impl Strategy<Value = ObservabilityConfig> {
    (
        prop::sample::select(vec!["trace", "debug", "info", "warn", "error"]),
        any::<bool>(),
    )
        .prop_map(|(level, json)| ObservabilityConfig {
            log_level: level.to_string(),
            json,
        })
}

// ── Serialized config parses back to the same values ─────────────────────

proptest! {
    #[test]
    fn config_survives_a_toml_round_trip(
        transport in arb_transport(),
        observability in arb_observability(),
    ) {
        let config = TraceConfig { transport, observability };
        let text = toml::to_string(&config).unwrap();
        let parsed = TraceConfig::from_toml(&text).unwrap();

        let (a, b) = (&config.transport, &parsed.transport);
        prop_assert_eq!(&a.endpoint, &b.endpoint);
        prop_assert_eq!(&a.path, &b.path);
        prop_assert_eq!(a.use_legacy, b.use_legacy);
        prop_assert_eq!(&a.user_agent, &b.user_agent);
        prop_assert_eq!(a.ping_interval_ms, b.ping_interval_ms);
        prop_assert_eq!(a.buffer_limit, b.buffer_limit);
        prop_assert_eq!(a.max_reconnect_time_ms, b.max_reconnect_time_ms);
        prop_assert_eq!(a.backoff_base_ms, b.backoff_base_ms);
        prop_assert_eq!(a.backoff_jitter_ms, b.backoff_jitter_ms);
        prop_assert_eq!(a.close_timeout_ms, b.close_timeout_ms);
        prop_assert_eq!(&config.observability.log_level, &parsed.observability.log_level);
        prop_assert_eq!(config.observability.json, parsed.observability.json);
    }
}

// ── Any non-ws scheme is refused ─────────────────────────────────────────

proptest! {
    #[test]
    fn non_websocket_endpoints_fail_validation(scheme in "(http|https|ftp|tcp)", host in "[a-z]{1,10}") {
        let mut config = TraceConfig::default();
        config.transport.endpoint = format!("{scheme}://{host}");
        prop_assert!(config.validate().is_err());
    }
}

// ── Ack frames decode for every value ────────────────────────────────────

proptest! {
    #[test]
    fn progress_ack_decodes_any_value(value in any::<u64>()) {
        let frame = json!({"type": "sn", "body": {"value": value}}).to_string();
        let message: ServerMessage = serde_json::from_str(&frame).unwrap();
        prop_assert_eq!(message, ServerMessage::SequenceNumber(SequenceAck::progress(value)));
    }

    #[test]
    fn initial_ack_is_recognised_for_any_value(value in any::<u64>()) {
        let frame = json!({"type": "sn", "body": {"value": value, "state": "initial"}}).to_string();
        let message: ServerMessage = serde_json::from_str(&frame).unwrap();
        let ServerMessage::SequenceNumber(ack) = message;
        prop_assert!(ack.is_initial());
        prop_assert_eq!(ack.value, value);
    }
}
