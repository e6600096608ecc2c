//! Integration tests for the fetch-and-estimate cycle.
//!
//! Each test stands up a wiremocked JSON-RPC node that answers
//! `eth_feeHistory`, then drives `FeeEstimationEngine::connect` against it
//! exactly as `main.rs` does. No live node needed.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method},
    Mock, MockServer, ResponseTemplate,
};

use gas_fee_estimator::{
    estimator::{CongestionMode, EstimationError, EstimatorConfig, FeeEstimationEngine},
    report::render_report,
};

// ---- Helpers ----------------------------------------------------------------

fn hex(value: u128) -> String {
    format!("{:#x}", value)
}

/// A ten-block `eth_feeHistory` result with a flat 1 gwei base fee.
fn fee_history_result(ratio: f64) -> Value {
    let tier_bases: [u128; 4] = [1_000_000_000, 1_500_000_000, 2_000_000_000, 3_000_000_000];
    let rewards: Vec<Vec<String>> = (0..10u128)
        .map(|i| tier_bases.iter().map(|b| hex(b + i * 10_000_000)).collect())
        .collect();

    json!({
        "oldestBlock": "0x5f5e100",
        "baseFeePerGas": vec![hex(1_000_000_000); 11],
        "gasUsedRatio": vec![ratio; 10],
        "reward": rewards,
    })
}

fn rpc_ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

fn fee_history_call() -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(body_partial_json(json!({
        "method": "eth_feeHistory",
    })))
}

/// Default config pointed at the mock server, with millisecond backoff so
/// retry tests stay fast.
fn config_for(server: &MockServer) -> EstimatorConfig {
    let mut config = EstimatorConfig::for_endpoint(server.uri());
    config.rpc.retry.base_delay_ms = 1;
    config.rpc.timeout_seconds = 1;
    config
}

// ---- Tests ------------------------------------------------------------------

#[tokio::test]
async fn estimates_tiers_from_live_style_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "eth_feeHistory",
            "params": ["0xa", "latest", [30.0, 60.0, 75.0, 90.0]],
        })))
        .respond_with(rpc_ok(fee_history_result(0.5)))
        .expect(1)
        .mount(&server)
        .await;

    let engine = FeeEstimationEngine::connect(config_for(&server)).unwrap();
    let report = engine.estimate(Some("Recommended")).await.unwrap();

    assert_eq!(report.estimates.len(), 4);
    assert_eq!(report.congestion.mode, CongestionMode::Neutral);
    let recommended = report.selected().unwrap();
    assert_eq!(recommended.tier_name, "Recommended");
    assert_eq!(recommended.max_priority_fee_per_gas, 2_045_000_000);
    assert_eq!(recommended.max_fee_per_gas, 4_072_286_530);
    assert_eq!(report.latest_block, Some(100_000_009));

    let table = render_report(&report, 21_000);
    assert!(table.contains("* Recommended"));
    assert!(table.contains("maxFeePerGas:         4072286530"));
}

#[tokio::test]
async fn retries_rate_limited_requests() {
    let server = MockServer::start().await;
    fee_history_call()
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    fee_history_call()
        .respond_with(rpc_ok(fee_history_result(0.9)))
        .expect(1)
        .mount(&server)
        .await;

    let engine = FeeEstimationEngine::connect(config_for(&server)).unwrap();
    let report = engine.estimate(None).await.unwrap();

    assert_eq!(report.congestion.mode, CongestionMode::Surge);
}

#[tokio::test]
async fn persistent_server_errors_surface_as_transport() {
    let server = MockServer::start().await;
    fee_history_call()
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let engine = FeeEstimationEngine::connect(config_for(&server)).unwrap();
    let err = engine.estimate(None).await.unwrap_err();

    assert!(matches!(err, EstimationError::Transport { attempts: 3, .. }));
}

#[tokio::test]
async fn rpc_error_object_is_not_retried() {
    let server = MockServer::start().await;
    fee_history_call()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "invalid block count" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = FeeEstimationEngine::connect(config_for(&server)).unwrap();
    let err = engine.estimate(None).await.unwrap_err();

    assert!(matches!(err, EstimationError::Transport { attempts: 1, .. }));
    assert!(err.to_string().contains("invalid block count"));
}

#[tokio::test]
async fn early_chain_response_is_data_integrity_error() {
    let server = MockServer::start().await;
    fee_history_call()
        .respond_with(rpc_ok(json!({
            "oldestBlock": "0x0",
            "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00", "0x3b9aca00"],
            "gasUsedRatio": [0.5, 0.5],
            "reward": [["0x1", "0x2", "0x3", "0x4"], ["0x1", "0x2", "0x3", "0x4"]],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = FeeEstimationEngine::connect(config_for(&server)).unwrap();
    let err = engine.estimate(None).await.unwrap_err();

    assert!(matches!(err, EstimationError::DataIntegrity { .. }));
}

#[tokio::test]
async fn garbage_body_is_data_integrity_error() {
    let server = MockServer::start().await;
    fee_history_call()
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = FeeEstimationEngine::connect(config_for(&server)).unwrap();
    let err = engine.estimate(None).await.unwrap_err();

    assert!(matches!(err, EstimationError::DataIntegrity { .. }));
}

#[tokio::test]
async fn engines_for_different_endpoints_coexist() {
    let quiet = MockServer::start().await;
    fee_history_call()
        .respond_with(rpc_ok(fee_history_result(0.2)))
        .mount(&quiet)
        .await;
    let busy = MockServer::start().await;
    fee_history_call()
        .respond_with(rpc_ok(fee_history_result(0.95)))
        .mount(&busy)
        .await;

    let quiet_engine = FeeEstimationEngine::connect(config_for(&quiet)).unwrap();
    let busy_engine = FeeEstimationEngine::connect(config_for(&busy)).unwrap();

    let (quiet_report, busy_report) =
        tokio::join!(quiet_engine.estimate(None), busy_engine.estimate(None));

    assert_eq!(quiet_report.unwrap().congestion.mode, CongestionMode::Discount);
    assert_eq!(busy_report.unwrap().congestion.mode, CongestionMode::Surge);
}

#[tokio::test]
async fn slow_node_times_out_and_is_retried() {
    let server = MockServer::start().await;
    fee_history_call()
        .respond_with(rpc_ok(fee_history_result(0.5)).set_delay(Duration::from_millis(1_500)))
        .expect(3)
        .mount(&server)
        .await;

    let engine = FeeEstimationEngine::connect(config_for(&server)).unwrap();
    let err = engine.estimate(None).await.unwrap_err();

    assert!(matches!(err, EstimationError::Transport { attempts: 3, .. }));
}
