//! Active health checking against live backends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use http_balancer::health::HealthState;

mod common;

async fn hits(balancer: &common::Balancer, requests: usize) -> (usize, usize) {
    let client = common::client();
    let (mut b1, mut b2) = (0, 0);
    for _ in 0..requests {
        if let Ok(res) = client.get(balancer.url("/")).send().await {
            match res.text().await.unwrap_or_default().as_str() {
                "b1" => b1 += 1,
                "b2" => b2 += 1,
                _ => {}
            }
        }
    }
    (b1, b2)
}

#[tokio::test]
async fn test_health_check_eviction_and_recovery() {
    let b1_healthy = Arc::new(AtomicBool::new(true));
    let b2_healthy = Arc::new(AtomicBool::new(true));
    let b1 = common::start_health_backend("b1", b1_healthy.clone()).await;
    let b2 = common::start_health_backend("b2", b2_healthy.clone()).await;

    let mut config = common::balancer_config("lb-health", &[("b1", b1), ("b2", b2)]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    config.health_check.unhealthy_threshold = 2;
    config.health_check.healthy_threshold = 1;
    let balancer = common::start_balancer(config).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    let (h1, h2) = hits(&balancer, 10).await;
    assert_eq!((h1, h2), (5, 5));

    b2_healthy.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(balancer.tracker.state(1), Some(HealthState::Unhealthy));
    let (h1, h2) = hits(&balancer, 10).await;
    assert_eq!(h1, 10, "only b1 should be hit after b2 eviction");
    assert_eq!(h2, 0);

    b2_healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(balancer.tracker.state(1), Some(HealthState::Healthy));
    let (_, h2) = hits(&balancer, 10).await;
    assert!(h2 > 0, "b2 should receive traffic again");
}

#[tokio::test]
async fn test_all_backends_failing_checks_yields_503() {
    let healthy = Arc::new(AtomicBool::new(false));
    let b1 = common::start_health_backend("b1", healthy.clone()).await;

    let mut config = common::balancer_config("lb-health-down", &[("b1", b1)]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    config.health_check.unhealthy_threshold = 1;
    let balancer = common::start_balancer(config).await;

    tokio::time::sleep(Duration::from_millis(500)).await;

    let res = common::client().get(balancer.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.headers()["x-server-name"], "lb-health-down");
}

#[tokio::test]
async fn test_unreachable_backend_is_evicted() {
    let healthy = Arc::new(AtomicBool::new(true));
    let live = common::start_health_backend("b1", healthy).await;

    let mut config = common::balancer_config(
        "lb-health-gone",
        &[("b1", live), ("gone", common::closed_addr())],
    );
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    config.health_check.unhealthy_threshold = 1;
    let balancer = common::start_balancer(config).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(balancer.tracker.state(1), Some(HealthState::Unhealthy));

    let (h1, _) = hits(&balancer, 4).await;
    assert_eq!(h1, 4);
}
