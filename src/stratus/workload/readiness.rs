use crate::stratus::api::ApiClient;
use crate::stratus::k8s::deployment::Deployment;
use crate::stratus::k8s::deploymentconfig::DeploymentConfig;
use crate::stratus::k8s::pod::{ContainerSpec, Pod};
use crate::stratus::k8s::replicaset::ReplicaSet;
use crate::stratus::k8s::replicationcontroller::ReplicationController;
use crate::stratus::k8s::statefulset::StatefulSet;
use crate::stratus::k8s::REVISION_ANNOTATION;
use crate::stratus::logger::{log_debug, log_info};
use crate::stratus::util::poll::{self, WaitContext};
use crate::stratus::workload::owner::current_child;
use crate::stratus::workload::pods::partition_pods;
use crate::stratus::workload::WorkloadError;

const COMPONENT: &str = "workload";

/// Whether the Deployment controller has caught up with the desired state.
/// Necessary but not sufficient for readiness: the controller excludes
/// not-running pods from its counters, so pod-level convergence is checked
/// separately.
pub fn deployment_status_converged(deployment: &Deployment) -> bool {
    let desired = deployment.spec.replicas;
    let Some(status) = deployment.status.as_ref() else {
        return false;
    };
    status.updated_replicas.unwrap_or(0) == desired
        && status.replicas.unwrap_or(0) == desired
        && status.available_replicas.unwrap_or(0) == desired
        && status.observed_generation.unwrap_or(0) >= deployment.metadata.generation.unwrap_or(0)
}

/// Whether the DeploymentConfig controller has caught up with the desired
/// state. Same shape as the Deployment check, on the DeploymentConfig's own
/// counters.
pub fn deployment_config_status_converged(config: &DeploymentConfig) -> bool {
    let desired = config.spec.replicas;
    let Some(status) = config.status.as_ref() else {
        return false;
    };
    status.updated_replicas.unwrap_or(0) == desired
        && status.replicas.unwrap_or(0) == desired
        && status.available_replicas.unwrap_or(0) == desired
        && status.observed_generation.unwrap_or(0) >= config.metadata.generation.unwrap_or(0)
}

/// Evaluates Deployment readiness against one snapshot of the cluster.
///
/// After status convergence, the current ReplicaSet is resolved through the
/// revision annotation and its pods partitioned; ready only when the running
/// cohort matches `availableReplicas` and nothing owned is in another phase.
pub fn evaluate_deployment(
    deployment: &Deployment,
    replica_sets: &[ReplicaSet],
    pods: &[Pod],
) -> Result<bool, WorkloadError> {
    if !deployment_status_converged(deployment) {
        return Ok(false);
    }

    let revision = deployment.metadata.annotation(REVISION_ANNOTATION);
    let replica_set = current_child::<ReplicaSet>(deployment.metadata.uid_str(), revision, replica_sets)?;
    let (running, not_running) = partition_pods(replica_set.metadata.uid_str(), pods);

    let available = deployment
        .status
        .as_ref()
        .and_then(|status| status.available_replicas)
        .unwrap_or(0);
    if running.len() as i32 != available {
        return Ok(false);
    }
    Ok(not_running.is_empty())
}

/// Evaluates StatefulSet readiness against one snapshot of the cluster.
///
/// The controller's `readyReplicas` counter is not cross-validated against
/// live pod phase the way Deployment status is, so the running cohort is
/// counted independently.
pub fn evaluate_stateful_set(set: &StatefulSet, pods: &[Pod]) -> bool {
    let desired = set.spec.replicas;
    let ready = set
        .status
        .as_ref()
        .and_then(|status| status.ready_replicas)
        .unwrap_or(0);
    if ready != desired {
        return false;
    }

    let (running, _) = partition_pods(set.metadata.uid_str(), pods);
    running.len() as i32 == desired
}

/// Evaluates DeploymentConfig readiness against one snapshot of the cluster.
///
/// The running cohort is compared against the raw `status.replicas` counter
/// rather than `availableReplicas` as for Deployments; the asymmetry is
/// deliberate, since changing it would change observable readiness timing.
pub fn evaluate_deployment_config(
    config: &DeploymentConfig,
    controllers: &[ReplicationController],
    pods: &[Pod],
) -> Result<bool, WorkloadError> {
    if !deployment_config_status_converged(config) {
        return Ok(false);
    }

    let revision = config.metadata.annotation(REVISION_ANNOTATION);
    let controller =
        current_child::<ReplicationController>(config.metadata.uid_str(), revision, controllers)?;
    let (running, not_running) = partition_pods(controller.metadata.uid_str(), pods);

    let replicas = config
        .status
        .as_ref()
        .and_then(|status| status.replicas)
        .unwrap_or(0);
    if running.len() as i32 != replicas {
        return Ok(false);
    }
    Ok(not_running.is_empty())
}

/// Checks whether the named Deployment has completed its rollout, reading
/// live state from the cluster.
pub async fn deployment_ready(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<bool, WorkloadError> {
    let deployment = get_deployment(cli, namespace, name).await?;
    if !deployment_status_converged(&deployment) {
        return Ok(false);
    }
    let replica_sets = list_replica_sets(cli, namespace).await?;
    let pods = list_pods(cli, namespace).await?;
    evaluate_deployment(&deployment, &replica_sets, &pods)
}

/// Checks whether the named StatefulSet has the desired number of ready
/// replicas, with every counted pod actually running.
pub async fn stateful_set_ready(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<bool, WorkloadError> {
    let set = get_stateful_set(cli, namespace, name).await?;
    let ready = set
        .status
        .as_ref()
        .and_then(|status| status.ready_replicas)
        .unwrap_or(0);
    if ready != set.spec.replicas {
        return Ok(false);
    }
    let pods = list_pods(cli, namespace).await?;
    Ok(evaluate_stateful_set(&set, &pods))
}

/// Checks whether the named DeploymentConfig has completed its rollout.
pub async fn deployment_config_ready(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<bool, WorkloadError> {
    let config = get_deployment_config(cli, namespace, name).await?;
    if !deployment_config_status_converged(&config) {
        return Ok(false);
    }
    let controllers = list_replication_controllers(cli, namespace).await?;
    let pods = list_pods(cli, namespace).await?;
    evaluate_deployment_config(&config, &controllers, &pods)
}

/// Returns the running and not-running pods of the Deployment's current
/// ReplicaSet.
pub async fn deployment_pods(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<(Vec<Pod>, Vec<Pod>), WorkloadError> {
    let deployment = get_deployment(cli, namespace, name).await?;
    let replica_sets = list_replica_sets(cli, namespace).await?;
    let revision = deployment.metadata.annotation(REVISION_ANNOTATION);
    let replica_set =
        current_child::<ReplicaSet>(deployment.metadata.uid_str(), revision, &replica_sets)?;
    let pods = list_pods(cli, namespace).await?;
    Ok(partition_pods(replica_set.metadata.uid_str(), &pods))
}

/// Returns the running and not-running pods owned by the StatefulSet.
pub async fn stateful_set_pods(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<(Vec<Pod>, Vec<Pod>), WorkloadError> {
    let set = get_stateful_set(cli, namespace, name).await?;
    let pods = list_pods(cli, namespace).await?;
    Ok(partition_pods(set.metadata.uid_str(), &pods))
}

/// Returns the running and not-running pods of the DeploymentConfig's
/// current ReplicationController.
pub async fn deployment_config_pods(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<(Vec<Pod>, Vec<Pod>), WorkloadError> {
    let config = get_deployment_config(cli, namespace, name).await?;
    let controllers = list_replication_controllers(cli, namespace).await?;
    let revision = config.metadata.annotation(REVISION_ANNOTATION);
    let controller =
        current_child::<ReplicationController>(config.metadata.uid_str(), revision, &controllers)?;
    let pods = list_pods(cli, namespace).await?;
    Ok(partition_pods(controller.metadata.uid_str(), &pods))
}

/// Returns the containers declared by the named pod.
pub async fn pod_containers(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<Vec<ContainerSpec>, WorkloadError> {
    let pod = cli.get_pod(namespace, name).await.map_err(|err| {
        WorkloadError::from_api(
            err,
            format!("could not get Pod{{Namespace: {namespace}, Name: {name}}}"),
        )
    })?;
    Ok(pod.spec.containers)
}

/// Polls until the Deployment reports ready. Absence is downgraded to
/// not-ready: the window between issuing an update and the orchestrator
/// materializing the new generation must not abort the wait. Any other
/// error stops the poll immediately.
pub async fn wait_on_deployment_ready(
    cli: &ApiClient,
    ctx: &WaitContext,
    namespace: &str,
    name: &str,
) -> Result<(), WorkloadError> {
    log_debug(
        COMPONENT,
        "waiting on Deployment readiness",
        &[("namespace", namespace), ("deployment", name)],
    );
    poll::wait(ctx, || {
        let cli = cli.clone();
        let namespace = namespace.to_string();
        let name = name.to_string();
        async move {
            match deployment_ready(&cli, &namespace, &name).await {
                Ok(ready) => Ok(ready),
                Err(err) if err.is_not_found() => Ok(false),
                Err(err) => Err(err),
            }
        }
    })
    .await
    .map_err(WorkloadError::from)
}

/// Polls until the StatefulSet reports ready, downgrading absence to
/// not-ready.
pub async fn wait_on_stateful_set_ready(
    cli: &ApiClient,
    ctx: &WaitContext,
    namespace: &str,
    name: &str,
) -> Result<(), WorkloadError> {
    log_debug(
        COMPONENT,
        "waiting on StatefulSet readiness",
        &[("namespace", namespace), ("statefulset", name)],
    );
    poll::wait(ctx, || {
        let cli = cli.clone();
        let namespace = namespace.to_string();
        let name = name.to_string();
        async move {
            match stateful_set_ready(&cli, &namespace, &name).await {
                Ok(ready) => Ok(ready),
                Err(err) if err.is_not_found() => Ok(false),
                Err(err) => Err(err),
            }
        }
    })
    .await
    .map_err(WorkloadError::from)
}

/// Polls until the DeploymentConfig reports ready, downgrading absence to
/// not-ready.
pub async fn wait_on_deployment_config_ready(
    cli: &ApiClient,
    ctx: &WaitContext,
    namespace: &str,
    name: &str,
) -> Result<(), WorkloadError> {
    log_debug(
        COMPONENT,
        "waiting on DeploymentConfig readiness",
        &[("namespace", namespace), ("deploymentconfig", name)],
    );
    poll::wait(ctx, || {
        let cli = cli.clone();
        let namespace = namespace.to_string();
        let name = name.to_string();
        async move {
            match deployment_config_ready(&cli, &namespace, &name).await {
                Ok(ready) => Ok(ready),
                Err(err) if err.is_not_found() => Ok(false),
                Err(err) => Err(err),
            }
        }
    })
    .await
    .map_err(WorkloadError::from)
}

/// Sets the Deployment's desired replica count and blocks until the rollout
/// converges. The returned error identifies whether the read, the update,
/// or the wait failed.
pub async fn scale_deployment(
    cli: &ApiClient,
    ctx: &WaitContext,
    namespace: &str,
    name: &str,
    replicas: i32,
) -> Result<(), WorkloadError> {
    let mut deployment = get_deployment(cli, namespace, name).await?;
    deployment.spec.replicas = replicas;
    cli.update_deployment(&deployment).await.map_err(|err| {
        WorkloadError::from_api(
            err,
            format!("could not update Deployment{{Namespace: {namespace}, Name: {name}}}"),
        )
    })?;

    let replica_str = replicas.to_string();
    log_info(
        COMPONENT,
        "scaled Deployment",
        &[
            ("namespace", namespace),
            ("deployment", name),
            ("replicas", replica_str.as_str()),
        ],
    );

    wait_on_deployment_ready(cli, ctx, namespace, name).await
}

/// Sets the StatefulSet's desired replica count and blocks until the
/// rollout converges.
pub async fn scale_stateful_set(
    cli: &ApiClient,
    ctx: &WaitContext,
    namespace: &str,
    name: &str,
    replicas: i32,
) -> Result<(), WorkloadError> {
    let mut set = get_stateful_set(cli, namespace, name).await?;
    set.spec.replicas = replicas;
    cli.update_stateful_set(&set).await.map_err(|err| {
        WorkloadError::from_api(
            err,
            format!("could not update StatefulSet{{Namespace: {namespace}, Name: {name}}}"),
        )
    })?;

    let replica_str = replicas.to_string();
    log_info(
        COMPONENT,
        "scaled StatefulSet",
        &[
            ("namespace", namespace),
            ("statefulset", name),
            ("replicas", replica_str.as_str()),
        ],
    );

    wait_on_stateful_set_ready(cli, ctx, namespace, name).await
}

async fn get_deployment(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<Deployment, WorkloadError> {
    cli.get_deployment(namespace, name).await.map_err(|err| {
        WorkloadError::from_api(
            err,
            format!("could not get Deployment{{Namespace: {namespace}, Name: {name}}}"),
        )
    })
}

async fn get_stateful_set(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<StatefulSet, WorkloadError> {
    cli.get_stateful_set(namespace, name).await.map_err(|err| {
        WorkloadError::from_api(
            err,
            format!("could not get StatefulSet{{Namespace: {namespace}, Name: {name}}}"),
        )
    })
}

async fn get_deployment_config(
    cli: &ApiClient,
    namespace: &str,
    name: &str,
) -> Result<DeploymentConfig, WorkloadError> {
    cli.get_deployment_config(namespace, name)
        .await
        .map_err(|err| {
            WorkloadError::from_api(
                err,
                format!("could not get DeploymentConfig{{Namespace: {namespace}, Name: {name}}}"),
            )
        })
}

async fn list_replica_sets(
    cli: &ApiClient,
    namespace: &str,
) -> Result<Vec<ReplicaSet>, WorkloadError> {
    cli.list_replica_sets(namespace)
        .await
        .map(|list| list.items)
        .map_err(|err| WorkloadError::from_api(err, "could not list ReplicaSets"))
}

async fn list_replication_controllers(
    cli: &ApiClient,
    namespace: &str,
) -> Result<Vec<ReplicationController>, WorkloadError> {
    cli.list_replication_controllers(namespace)
        .await
        .map(|list| list.items)
        .map_err(|err| WorkloadError::from_api(err, "could not list ReplicationControllers"))
}

async fn list_pods(cli: &ApiClient, namespace: &str) -> Result<Vec<Pod>, WorkloadError> {
    cli.list_pods(namespace)
        .await
        .map(|list| list.items)
        .map_err(|err| WorkloadError::from_api(err, "could not list Pods"))
}
