use std::time::Duration;

use serial_test::serial;
use tokio_util::sync::CancellationToken;

use stratus::stratus::k8s::pod::PodPhase;
use stratus::stratus::util::poll::WaitContext;
use stratus::stratus::workload::readiness::wait_on_deployment_ready;
use stratus::stratus::workload::WorkloadError;

use super::fixtures::*;
use crate::support::{client_for, FakeCluster};

fn fast_context(token: CancellationToken) -> WaitContext {
    WaitContext::with_timeout(token, Duration::from_secs(5)).interval(Duration::from_millis(5))
}

#[tokio::test]
#[serial]
async fn already_cancelled_context_never_polls() {
    let cluster = FakeCluster::start().await;
    let cli = client_for(&cluster);

    let token = CancellationToken::new();
    token.cancel();

    let err = wait_on_deployment_ready(&cli, &fast_context(token), NAMESPACE, "web")
        .await
        .expect_err("cancelled context");
    assert!(matches!(err, WorkloadError::Cancelled(_)));
    assert!(cluster.recorded().is_empty(), "no call may be issued");
}

#[tokio::test]
#[serial]
async fn deadline_expiry_reports_cancelled() {
    let cluster = FakeCluster::start().await;
    let cli = client_for(&cluster);

    let ctx = WaitContext::with_timeout(CancellationToken::new(), Duration::ZERO);
    let err = wait_on_deployment_ready(&cli, &ctx, NAMESPACE, "web")
        .await
        .expect_err("expired deadline");
    assert!(matches!(err, WorkloadError::Cancelled(_)));
    assert!(cluster.recorded().is_empty());
}

#[tokio::test]
#[serial]
async fn absence_downgrades_to_not_ready_until_the_generation_appears() {
    let cluster = FakeCluster::start().await;
    let cli = client_for(&cluster);

    // The deployment 404s twice before the cluster materializes it; the
    // poller must ride through the window instead of aborting.
    cluster.stub_not_found("GET", &deployment_path("web"));
    cluster.stub_not_found("GET", &deployment_path("web"));
    cluster.stub(
        "GET",
        &deployment_path("web"),
        200,
        &converged_deployment("web", "dep-uid", 1, "1"),
    );
    cluster.stub(
        "GET",
        &replica_sets_path(),
        200,
        &replica_set_list(vec![replica_set(
            "web-new",
            "rs-new",
            Some(owner_ref("Deployment", "web", "dep-uid")),
            "1",
        )]),
    );
    cluster.stub(
        "GET",
        &pods_path(),
        200,
        &pod_list(vec![pod(
            "web-new-a",
            Some(owner_ref("ReplicaSet", "web-new", "rs-new")),
            PodPhase::Running,
        )]),
    );

    wait_on_deployment_ready(&cli, &fast_context(CancellationToken::new()), NAMESPACE, "web")
        .await
        .expect("converges after the 404 window");

    let deployment_gets = cluster
        .recorded()
        .iter()
        .filter(|request| request.method == "GET" && request.path == deployment_path("web"))
        .count();
    assert!(deployment_gets >= 3, "expected retries, saw {deployment_gets}");
}

#[tokio::test]
#[serial]
async fn transport_failure_aborts_the_poll() {
    let cluster = FakeCluster::start().await;
    let cli = client_for(&cluster);

    cluster.stub(
        "GET",
        &deployment_path("web"),
        500,
        &serde_json::json!({"kind": "Status", "message": "etcdserver: request timed out"}),
    );

    let err = wait_on_deployment_ready(&cli, &fast_context(CancellationToken::new()), NAMESPACE, "web")
        .await
        .expect_err("transport failure");
    assert!(matches!(err, WorkloadError::Transport(_)));

    let attempts = cluster.recorded().len();
    assert_eq!(attempts, 1, "transport errors must not be retried");
}
