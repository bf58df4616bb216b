//! Integration tests for the publisher → RTDB adapter pipeline.
//!
//! Uses the RtdbClient's host simulation backend, so the whole
//! ready-gate / publish / partial-failure path runs exactly as wired in
//! the firmware, minus the network.

use crate::mock_hw::RecordingSink;
use farmflow::adapters::rtdb::RtdbClient;
use farmflow::app::events::AppEvent;
use farmflow::app::telemetry::TelemetryPublisher;
use farmflow::config::SystemConfig;

fn configured_client() -> RtdbClient {
    let mut config = SystemConfig::default();
    config
        .rtdb_url
        .push_str("https://farm-rtdb.example.firebasedatabase.app")
        .unwrap();
    config.api_key.push_str("test-api-key").unwrap();
    RtdbClient::new(&config)
}

#[test]
fn offline_store_defers_first_publish_until_link_up() {
    let mut rtdb = configured_client();
    rtdb.sign_up().unwrap();
    let mut publisher = TelemetryPublisher::new(15_000);
    let mut sink = RecordingSink::new();

    // Link down: cycles skip without consuming the window.
    for now in 0..20_000u64 {
        assert_eq!(
            publisher.maybe_publish(now, [1.0, 2.0], &mut rtdb, &mut sink),
            None
        );
    }
    assert!(rtdb.sim_writes().is_empty());

    // Link restored: the very next iteration publishes.
    rtdb.set_link_up(true);
    assert_eq!(
        publisher.maybe_publish(20_000, [1.0, 2.0], &mut rtdb, &mut sink),
        Some(true)
    );
    assert_eq!(rtdb.sim_writes().len(), 2);
}

#[test]
fn channel_failure_is_isolated_and_reported() {
    let mut rtdb = configured_client();
    rtdb.sign_up().unwrap();
    rtdb.set_link_up(true);
    rtdb.sim_fail_path(Some("sensor/volume1"));

    let mut publisher = TelemetryPublisher::new(15_000);
    let mut sink = RecordingSink::new();

    let outcome = publisher.maybe_publish(0, [10.0, 20.0], &mut rtdb, &mut sink);
    assert_eq!(outcome, Some(false));

    // volume2 landed despite volume1's transport failure.
    assert_eq!(rtdb.sim_writes().len(), 1);
    assert_eq!(rtdb.sim_writes()[0].0, "sensor/volume2");
    assert!((rtdb.sim_writes()[0].1 - 20.0).abs() < 1e-6);

    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::TelemetryChannelFailed {
            path: "sensor/volume1",
            ..
        }
    )));
}

#[test]
fn recovered_channel_publishes_current_totals_not_old_snapshot() {
    let mut rtdb = configured_client();
    rtdb.sign_up().unwrap();
    rtdb.set_link_up(true);
    rtdb.sim_fail_path(Some("sensor/volume2"));

    let mut publisher = TelemetryPublisher::new(15_000);
    let mut sink = RecordingSink::new();

    publisher.maybe_publish(0, [10.0, 20.0], &mut rtdb, &mut sink);
    rtdb.sim_fail_path(None);
    publisher.maybe_publish(15_001, [11.0, 22.0], &mut rtdb, &mut sink);

    let volume2: Vec<f32> = rtdb
        .sim_writes()
        .iter()
        .filter(|(p, _)| p == "sensor/volume2")
        .map(|(_, v)| *v)
        .collect();
    // The 20.0 snapshot was never retried; the store got the newer total.
    assert_eq!(volume2, vec![22.0]);
}

#[test]
fn publish_window_holds_across_aggressive_polling() {
    let mut rtdb = configured_client();
    rtdb.sign_up().unwrap();
    rtdb.set_link_up(true);

    let mut publisher = TelemetryPublisher::new(15_000);
    let mut sink = RecordingSink::new();

    let mut cycles = 0;
    for now in 0..30_002u64 {
        if publisher
            .maybe_publish(now, [0.0, 0.0], &mut rtdb, &mut sink)
            .is_some()
        {
            cycles += 1;
        }
    }
    assert_eq!(cycles, 2);
    assert_eq!(rtdb.sim_writes().len(), 4);
}
