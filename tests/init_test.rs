mod common;

use compute_pricelist_histories::config::ServiceConfig;
use compute_pricelist_histories::engine::Engine;
use compute_pricelist_histories::init::bootstrap;
use compute_pricelist_histories::logging::LogConfig;
use compute_pricelist_histories::tuple::RegionRealmTimestampTuple;

// The log sink is process-global, so only one test in this binary may
// complete a successful bootstrap. The failure cases stop before logging.

#[tokio::test]
async fn bootstrap_builds_state_from_metadata() {
    let host = common::spawn_metadata("sotah-prod").await;
    let config = ServiceConfig {
        service_name: Some("fn-compute-pricelist-histories".to_string()),
        metadata_host: host,
        database: ":memory:".to_string(),
        ..ServiceConfig::default()
    };

    let state = bootstrap(&config).await.unwrap();

    assert_eq!(state.identity.project_id, "sotah-prod");
    assert_eq!(state.identity.service_name, "fn-compute-pricelist-histories");

    // Fresh database: nothing to compute yet, but the engine answers.
    let msg = state
        .engine
        .run(RegionRealmTimestampTuple::new("us", "mal-ganis", 1000))
        .await;
    assert!(!msg.code.is_ok());
}

#[tokio::test]
async fn bootstrap_fails_without_service_name() {
    let config = ServiceConfig {
        project_id: Some("p".to_string()),
        database: ":memory:".to_string(),
        ..ServiceConfig::default()
    };

    let err = bootstrap(&config).await.err().unwrap();

    assert!(format!("{err:#}").contains("FUNCTION_NAME"));
}

#[tokio::test]
async fn bootstrap_fails_when_metadata_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let config = ServiceConfig {
        service_name: Some("svc".to_string()),
        metadata_host: host,
        database: ":memory:".to_string(),
        ..ServiceConfig::default()
    };

    let err = bootstrap(&config).await.err().unwrap();

    assert!(format!("{err:#}").contains("failed to resolve process identity"));
}

#[tokio::test]
async fn bootstrap_fails_on_invalid_log_level() {
    let config = ServiceConfig {
        service_name: Some("svc".to_string()),
        project_id: Some("p".to_string()),
        database: ":memory:".to_string(),
        log: LogConfig {
            level: "pricelist=verbose".to_string(),
            ..LogConfig::default()
        },
        ..ServiceConfig::default()
    };

    let err = bootstrap(&config).await.err().unwrap();

    let chain = format!("{err:#}");
    assert!(chain.contains("failed to configure logging"));
    assert!(chain.contains("invalid log level"));
}

#[tokio::test]
async fn bootstrap_fails_on_malformed_rust_log() {
    let config = ServiceConfig {
        service_name: Some("svc".to_string()),
        project_id: Some("p".to_string()),
        database: ":memory:".to_string(),
        log: LogConfig {
            filter: Some("pricelist=verbose".to_string()),
            ..LogConfig::default()
        },
        ..ServiceConfig::default()
    };

    let err = bootstrap(&config).await.err().unwrap();

    assert!(format!("{err:#}").contains("invalid RUST_LOG"));
}
