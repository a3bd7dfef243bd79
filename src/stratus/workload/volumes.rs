use crate::stratus::k8s::deployment::Deployment;
use crate::stratus::k8s::deploymentconfig::DeploymentConfig;
use crate::stratus::k8s::pod::{Pod, VolumeSpec};
use crate::stratus::k8s::statefulset::StatefulSet;
use std::collections::HashMap;

/// Returns the claims referenced by a Deployment's pod template as a
/// `volume name -> claim name` map. Volumes backed by anything other than a
/// persistent volume claim are skipped.
pub fn deployment_volumes(deployment: &Deployment) -> HashMap<String, String> {
    claim_bindings(&deployment.spec.template.spec.volumes)
}

/// Returns the claims referenced by a DeploymentConfig's pod template as a
/// `volume name -> claim name` map.
pub fn deployment_config_volumes(config: &DeploymentConfig) -> HashMap<String, String> {
    config
        .spec
        .template
        .as_ref()
        .map(|template| claim_bindings(&template.spec.volumes))
        .unwrap_or_default()
}

fn claim_bindings(volumes: &[VolumeSpec]) -> HashMap<String, String> {
    volumes
        .iter()
        .filter_map(|volume| {
            volume
                .persistent_volume_claim
                .as_ref()
                .map(|claim| (volume.name.clone(), claim.claim_name.clone()))
        })
        .collect()
}

/// Parses the ordinal a StatefulSet encodes in its pod names: a suffix of
/// `-<nonnegative integer>` after any base name. Names without the suffix
/// yield `None`: such a pod was not created through a StatefulSet.
pub fn pod_ordinal(pod_name: &str) -> Option<u32> {
    let (_, suffix) = pod_name.rsplit_once('-')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Returns the claims backing one StatefulSet pod as a
/// `volume name -> claim name` map.
///
/// Claim templates not explicitly referenced by a pod-template volume are
/// still materialized by the orchestrator, which implicitly creates a pod
/// volume named after the claim template; identity entries cover those.
/// Claim names are synthesized as `<claimTemplate>-<setName>-<ordinal>`,
/// the same convention the orchestrator itself uses, since the result is
/// used to fetch the real claim objects. This is pure name construction:
/// no existence checks are made.
pub fn stateful_set_volumes(set: &StatefulSet, pod: &Pod) -> HashMap<String, String> {
    let Some(ordinal) = pod.metadata.name.as_deref().and_then(pod_ordinal) else {
        return HashMap::new();
    };

    let mut template_to_volume: HashMap<&str, &str> = HashMap::new();
    for volume in &set.spec.template.spec.volumes {
        if let Some(claim) = volume.persistent_volume_claim.as_ref() {
            template_to_volume.insert(claim.claim_name.as_str(), volume.name.as_str());
        }
    }
    for template in &set.spec.volume_claim_templates {
        let name = template.template_name();
        template_to_volume.entry(name).or_insert(name);
    }

    let set_name = set.metadata.name.as_deref().unwrap_or("");
    template_to_volume
        .into_iter()
        .map(|(template_name, volume_name)| {
            (
                volume_name.to_string(),
                format!("{}-{}-{}", template_name, set_name, ordinal),
            )
        })
        .collect()
}
