use crate::stratus::k8s::pod::Pod;

/// Splits the pods owned by the given UID into running and not-running
/// cohorts.
///
/// A pod belongs to the cohort only with exactly one owner reference whose
/// UID matches; anything else is dropped. Every owned pod lands in exactly
/// one of the two sets: `Running` phase on one side, every other phase
/// (Pending, Succeeded, Failed, Unknown, or no status at all) on the other.
pub fn partition_pods(owner_uid: &str, pods: &[Pod]) -> (Vec<Pod>, Vec<Pod>) {
    let mut running = Vec::new();
    let mut not_running = Vec::new();

    for pod in pods {
        let owners = &pod.metadata.owner_references;
        if owners.len() != 1 || owners[0].uid != owner_uid {
            continue;
        }
        if pod.is_running() {
            running.push(pod.clone());
        } else {
            not_running.push(pod.clone());
        }
    }

    (running, not_running)
}
