use crate::stratus::k8s::pod::{ObjectMeta, OwnerReference};
use crate::stratus::k8s::replicaset::ReplicaSet;
use crate::stratus::k8s::replicationcontroller::ReplicationController;
use crate::stratus::k8s::REVISION_ANNOTATION;
use crate::stratus::workload::WorkloadError;

/// Per-rollout grouping object owned by a controller: a ReplicaSet for
/// Deployments, a ReplicationController for DeploymentConfigs. One revision
/// of the controller corresponds to exactly one of these.
pub trait ChildGeneration {
    fn metadata(&self) -> &ObjectMeta;

    /// Resource kind used in lookup failure messages.
    fn kind_name() -> &'static str;

    fn owner_references(&self) -> &[OwnerReference] {
        &self.metadata().owner_references
    }

    fn uid(&self) -> &str {
        self.metadata().uid_str()
    }

    fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or("")
    }

    /// Rollout revision recorded on this generation, empty when the
    /// annotation is absent.
    fn revision(&self) -> &str {
        self.metadata().annotation(REVISION_ANNOTATION)
    }
}

impl ChildGeneration for ReplicaSet {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn kind_name() -> &'static str {
        "ReplicaSet"
    }
}

impl ChildGeneration for ReplicationController {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn kind_name() -> &'static str {
        "ReplicationController"
    }
}

/// Resolves the child generation currently live for the given owner and
/// revision.
///
/// Candidates without exactly one owner reference are never attributed to
/// any controller. Among the rest, the owner UID and the revision annotation
/// must both match exactly. Zero and multiple survivors both collapse to
/// `NotFound`; an ambiguous collection is never resolved by picking one.
pub fn current_child<'a, C>(
    owner_uid: &str,
    revision: &str,
    candidates: &'a [C],
) -> Result<&'a C, WorkloadError>
where
    C: ChildGeneration,
{
    let mut matches = candidates.iter().filter(|candidate| {
        let owners = candidate.owner_references();
        owners.len() == 1 && owners[0].uid == owner_uid && candidate.revision() == revision
    });

    match (matches.next(), matches.next()) {
        (Some(child), None) => Ok(child),
        (None, _) => Err(WorkloadError::NotFound(format!(
            "could not find a {} for owner UID {} at revision {:?}",
            C::kind_name(),
            owner_uid,
            revision
        ))),
        (Some(_), Some(_)) => Err(WorkloadError::NotFound(format!(
            "multiple {}s match owner UID {} at revision {:?}",
            C::kind_name(),
            owner_uid,
            revision
        ))),
    }
}
