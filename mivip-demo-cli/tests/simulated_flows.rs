//! End-to-end flows through the bridge with the simulated engine.

use mivip_bridge::{BridgeConfig, BridgeError, RequestState, RequestStatus, VerificationEngine};
use mivip_demo_cli::commands::{build_bridge, drive, SimulationArgs};
use mivip_demo_cli::simulator::{Ending, ScanScript, SimulatedEngine, TerminalHost};
use std::time::Duration;

const ID: &str = "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b";

fn simulation(ending: Ending) -> SimulatedEngine {
    SimulatedEngine::new(Duration::from_millis(900), ending)
}

#[tokio::test(start_paused = true)]
async fn test_start_reports_result() {
    let bridge = build_bridge(
        BridgeConfig::default(),
        simulation(Ending::Result("PASSED".into())),
    )
    .unwrap();

    let outcome = drive(&bridge, "test", bridge.start_verification(&ID.to_uppercase()), false)
        .await
        .unwrap();
    assert_eq!(outcome.request_id.as_str(), ID);
    assert_eq!(outcome.result, "PASSED");
}

#[tokio::test(start_paused = true)]
async fn test_progress_statuses_are_published() {
    let bridge = build_bridge(
        BridgeConfig::default(),
        simulation(Ending::Result("PASSED".into())),
    )
    .unwrap();
    let mut updates = bridge.subscribe();

    bridge.start_verification(ID).await.unwrap();

    let mut statuses = Vec::new();
    while let Ok(update) = updates.try_recv() {
        if let RequestState::Loading {
            status: Some(status),
        } = update.state
        {
            statuses.push(status);
        }
    }
    assert_eq!(
        statuses,
        vec![
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Submitted
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_engine_failure() {
    let bridge = build_bridge(
        BridgeConfig::default(),
        simulation(Ending::Error("document unreadable".into())),
    )
    .unwrap();

    let err = bridge.start_verification(ID).await.unwrap_err();
    assert_eq!(err, BridgeError::EngineError("document unreadable".into()));
}

#[tokio::test(start_paused = true)]
async fn test_hang_times_out() {
    let bridge = build_bridge(
        BridgeConfig::default().with_timeout(3),
        simulation(Ending::Hang),
    )
    .unwrap();

    let err = drive(&bridge, "test", bridge.start_verification(ID), true)
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<BridgeError>(),
        Some(&BridgeError::Timeout { timeout_secs: 3 })
    );
    assert_eq!(bridge.registry().pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_scan_scripts() {
    let engine = simulation(Ending::Result("PASSED".into()))
        .with_scan(ScanScript::Payload(format!("mivip://request/{}", ID)));
    let bridge = build_bridge(BridgeConfig::default(), engine).unwrap();
    assert_eq!(bridge.scan_and_start().await.unwrap().request_id.as_str(), ID);

    let engine = simulation(Ending::Result("PASSED".into())).with_scan(ScanScript::DenyCamera);
    let bridge = build_bridge(BridgeConfig::default(), engine).unwrap();
    assert_eq!(
        bridge.scan_and_start().await.unwrap_err(),
        BridgeError::CameraPermission
    );

    let engine = simulation(Ending::Result("PASSED".into()))
        .with_scan(ScanScript::Payload("not a request".into()));
    let bridge = build_bridge(BridgeConfig::default(), engine).unwrap();
    assert_eq!(
        bridge.scan_and_start().await.unwrap_err(),
        BridgeError::InvalidQrPayload
    );
}

#[tokio::test(start_paused = true)]
async fn test_code_resolution() {
    let engine = simulation(Ending::Result("PASSED".into())).with_code("K7Q2", ID.to_uppercase());
    let bridge = build_bridge(BridgeConfig::default(), engine).unwrap();

    let outcome = bridge.start_verification_by_code("K7Q2").await.unwrap();
    assert_eq!(outcome.request_id.as_str(), ID);

    let err = bridge.start_verification_by_code("ZZZZ").await.unwrap_err();
    assert!(matches!(err, BridgeError::InvalidIdentifier(_)));
}

#[test]
fn test_engine_receives_hub_settings() {
    tokio_test::block_on(async {
        let config = BridgeConfig::default();
        let engine = std::sync::Arc::new(simulation(Ending::Hang));
        let _bridge = mivip_bridge::VerificationBridge::new(
            engine.clone(),
            std::sync::Arc::new(TerminalHost),
            config.clone(),
        )
        .unwrap();
        assert_eq!(engine.applied_settings(), Some(config.hub));
    });
}

#[test]
fn test_simulated_code_lookup() {
    let engine = SimulatedEngine::new(Duration::ZERO, Ending::Hang).with_code("ABC", ID);
    let found = tokio_test::block_on(engine.request_id_from_code("ABC")).unwrap();
    assert_eq!(found.as_deref(), Some(ID));
    let missing = tokio_test::block_on(engine.request_id_from_code("XYZ")).unwrap();
    assert_eq!(missing, None);
}

#[test]
fn test_simulation_args_build_engine() {
    let args = SimulationArgs {
        delay_ms: 250,
        result: "REVIEW".into(),
        fail: None,
        hang: false,
    };
    assert_eq!(args.ending(), Ending::Result("REVIEW".into()));
}
