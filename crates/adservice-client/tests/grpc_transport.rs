mod common;

use adservice_client::*;
use common::*;
use opentelemetry::trace::Status;
use opentelemetry::Value;
use std::net::TcpListener;
use std::time::{Duration, Instant};

/// A local port with nothing listening on it
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[test]
fn construction_does_not_wait_for_the_server() {
    let harness = Harness::new();
    let started = Instant::now();
    let client = AdServiceClient::new("127.0.0.1", closed_port(), harness.telemetry.clone()).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    client.shutdown();
}

#[test]
fn unreachable_server_fails_on_first_call_only() {
    let harness = Harness::new();
    let config = ClientConfig::new("127.0.0.1", closed_port()).with_call_timeout(Duration::from_secs(5));
    let client = AdServiceClient::from_config(&config, harness.telemetry.clone()).unwrap();

    let ads = client.get_ads("camera").unwrap();
    assert!(ads.is_empty());

    let spans = harness.finished_spans();
    assert_eq!(spans.len(), 1);
    match &spans[0].status {
        Status::Error { description } => {
            assert!(description.starts_with("gRPC status:"), "{description}")
        }
        other => panic!("call to a closed port succeeded: {other:?}"),
    }
    assert_eq!(
        attribute(&spans[0], "net.peer.ip"),
        Some(Value::from("127.0.0.1"))
    );

    let started = Instant::now();
    client.shutdown();
    client.shutdown();
    assert!(started.elapsed() <= SHUTDOWN_GRACE_PERIOD + Duration::from_secs(1));
}

#[test]
fn malformed_address_is_a_setup_error() {
    let harness = Harness::new();
    let err = AdServiceClient::new("not a host", 9555, harness.telemetry.clone())
        .err()
        .expect("construction should fail");
    assert!(matches!(err, ClientError::ConnectionSetup { .. }), "{err}");
}
