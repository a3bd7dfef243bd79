use stratus::stratus::k8s::deployment::{Deployment, DeploymentSpec};
use stratus::stratus::k8s::persistentvolumeclaim::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec,
};
use stratus::stratus::k8s::pod::{
    ObjectMeta, PersistentVolumeClaimVolumeSource, Pod, PodSpec, VolumeSpec,
};
use stratus::stratus::k8s::statefulset::{
    LabelSelector, PodTemplateSpec, StatefulSet, StatefulSetSpec,
};
use stratus::stratus::workload::volumes::{
    deployment_volumes, pod_ordinal, stateful_set_volumes,
};

fn claim_volume(volume_name: &str, claim_name: &str) -> VolumeSpec {
    VolumeSpec {
        name: volume_name.to_string(),
        persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
            claim_name: claim_name.to_string(),
            read_only: None,
        }),
        ..Default::default()
    }
}

fn claim_template(name: &str) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        api_version: None,
        kind: None,
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: PersistentVolumeClaimSpec::default(),
    }
}

fn named_object(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn stateful_set_with(
    name: &str,
    volumes: Vec<VolumeSpec>,
    templates: Vec<PersistentVolumeClaim>,
) -> StatefulSet {
    StatefulSet::new(
        named_object(name),
        StatefulSetSpec {
            service_name: name.to_string(),
            replicas: 3,
            selector: LabelSelector::default(),
            template: PodTemplateSpec {
                metadata: ObjectMeta::default(),
                spec: PodSpec {
                    volumes,
                    ..Default::default()
                },
            },
            volume_claim_templates: templates,
        },
    )
}

fn named_pod(name: &str) -> Pod {
    Pod::new(named_object(name), PodSpec::default())
}

#[test]
fn claim_names_follow_the_controller_convention() {
    // Claim template "data", set "web", pod ordinal 3 -> claim "data-web-3".
    let set = stateful_set_with("web", Vec::new(), vec![claim_template("data")]);
    let bindings = stateful_set_volumes(&set, &named_pod("web-3"));

    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings.get("data").map(String::as_str), Some("data-web-3"));
}

#[test]
fn explicit_references_keep_the_declared_volume_name() {
    let set = stateful_set_with(
        "web",
        vec![claim_volume("www", "data")],
        vec![claim_template("data"), claim_template("logs")],
    );
    let bindings = stateful_set_volumes(&set, &named_pod("web-0"));

    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings.get("www").map(String::as_str), Some("data-web-0"));
    assert_eq!(bindings.get("logs").map(String::as_str), Some("logs-web-0"));
}

#[test]
fn pod_without_ordinal_is_not_part_of_the_set() {
    let set = stateful_set_with("web", Vec::new(), vec![claim_template("data")]);
    assert!(stateful_set_volumes(&set, &named_pod("web")).is_empty());
    assert_eq!(pod_ordinal("web-3"), Some(3));
    assert_eq!(pod_ordinal("web"), None);
}

#[test]
fn repeated_mapping_is_identical() {
    let set = stateful_set_with(
        "web",
        vec![claim_volume("www", "data")],
        vec![claim_template("data")],
    );
    let pod = named_pod("web-2");

    let first = stateful_set_volumes(&set, &pod);
    for _ in 0..3 {
        assert_eq!(stateful_set_volumes(&set, &pod), first);
    }
}

#[test]
fn deployment_bindings_come_from_declared_claims_only() {
    let deployment = Deployment::new(
        named_object("web"),
        DeploymentSpec {
            replicas: 1,
            selector: LabelSelector::default(),
            template: PodTemplateSpec {
                metadata: ObjectMeta::default(),
                spec: PodSpec {
                    volumes: vec![
                        claim_volume("data", "web-data"),
                        VolumeSpec {
                            name: "scratch".to_string(),
                            ..Default::default()
                        },
                    ],
                    ..Default::default()
                },
            },
        },
    );

    let bindings = deployment_volumes(&deployment);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings.get("data").map(String::as_str), Some("web-data"));
}
