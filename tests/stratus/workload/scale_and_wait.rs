use std::time::Duration;

use serial_test::serial;
use tokio_util::sync::CancellationToken;

use stratus::stratus::k8s::pod::PodPhase;
use stratus::stratus::k8s::statefulset::StatefulSet;
use stratus::stratus::util::poll::WaitContext;
use stratus::stratus::workload::readiness::{scale_deployment, scale_stateful_set};
use stratus::stratus::workload::WorkloadError;

use super::fixtures::*;
use crate::support::{client_for, FakeCluster};

fn fast_context() -> WaitContext {
    WaitContext::with_timeout(CancellationToken::new(), Duration::from_secs(5))
        .interval(Duration::from_millis(5))
}

#[tokio::test]
#[serial]
async fn scale_stateful_set_updates_and_waits_for_convergence() {
    let cluster = FakeCluster::start().await;
    let cli = client_for(&cluster);

    // Read step sees one replica; after the update the cluster reports the
    // scaled-out state.
    cluster.stub(
        "GET",
        &stateful_set_path("db"),
        200,
        &stateful_set("db", "set-uid", 1, 1),
    );
    cluster.stub(
        "GET",
        &stateful_set_path("db"),
        200,
        &stateful_set("db", "set-uid", 2, 2),
    );
    cluster.stub(
        "PUT",
        &stateful_set_path("db"),
        200,
        &stateful_set("db", "set-uid", 2, 1),
    );
    cluster.stub(
        "GET",
        &pods_path(),
        200,
        &pod_list(vec![
            pod(
                "db-0",
                Some(owner_ref("StatefulSet", "db", "set-uid")),
                PodPhase::Running,
            ),
            pod(
                "db-1",
                Some(owner_ref("StatefulSet", "db", "set-uid")),
                PodPhase::Running,
            ),
        ]),
    );

    scale_stateful_set(&cli, &fast_context(), NAMESPACE, "db", 2)
        .await
        .expect("scale and wait");

    let put = cluster
        .recorded()
        .into_iter()
        .find(|request| request.method == "PUT")
        .expect("update issued");
    assert_eq!(put.path, stateful_set_path("db"));
    let sent: StatefulSet = serde_json::from_str(&put.body).expect("update payload");
    assert_eq!(sent.spec.replicas, 2);
}

#[tokio::test]
#[serial]
async fn scale_deployment_surfaces_the_failing_step() {
    let cluster = FakeCluster::start().await;
    let cli = client_for(&cluster);

    cluster.stub(
        "GET",
        &deployment_path("web"),
        200,
        &converged_deployment("web", "dep-uid", 1, "1"),
    );
    cluster.stub(
        "PUT",
        &deployment_path("web"),
        409,
        &serde_json::json!({"kind": "Status", "message": "the object has been modified"}),
    );

    let err = scale_deployment(&cli, &fast_context(), NAMESPACE, "web", 2)
        .await
        .expect_err("conflicting update");
    assert!(matches!(err, WorkloadError::Transport(_)));
    assert!(
        err.to_string().contains("could not update Deployment"),
        "step not identified: {err}"
    );
}

#[tokio::test]
#[serial]
async fn scale_deployment_read_failure_is_not_found() {
    let cluster = FakeCluster::start().await;
    let cli = client_for(&cluster);

    cluster.stub_not_found("GET", &deployment_path("gone"));

    let err = scale_deployment(&cli, &fast_context(), NAMESPACE, "gone", 2)
        .await
        .expect_err("absent deployment");
    assert!(err.is_not_found());
    assert!(
        err.to_string().contains("could not get Deployment"),
        "step not identified: {err}"
    );
}
