//! Integration tests for child resource assembly
//!
//! These tests verify that the builders translate component specs into the
//! expected Deployments, StatefulSets, Services, PVCs, and CA bootstrap
//! objects: field mapping, defaulting, and ownership.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use chia_operator::crd::{
    ChiaCA, ChiaCASpec, ChiaNode, ChiaNodeSpec, CommonSpec, HostPathSpec, PlotVolumeSpec, PvcSpec,
    StorageSpec, VolumeSourceSpec,
};
use chia_operator::resources::container::{build_chia_container, container_port, KEYS_NONE};
use chia_operator::resources::workloads::{
    build_deployment, build_pvc, build_service, build_statefulset, service_port,
};
use chia_operator::resources::{ports, rbac, volumes, DEFAULT_CHIA_IMAGE};

// ============================================================================
// Test Helpers
// ============================================================================

fn test_node(common: CommonSpec) -> ChiaNode {
    ChiaNode {
        metadata: ObjectMeta {
            name: Some("mainnet".to_string()),
            namespace: Some("chia".to_string()),
            uid: Some("abc-123".to_string()),
            ..Default::default()
        },
        spec: ChiaNodeSpec {
            common,
            replicas: 3,
            full_node_peers: None,
        },
        status: None,
    }
}

fn test_ca() -> ChiaCA {
    ChiaCA {
        metadata: ObjectMeta {
            name: Some("mainnet-ca".to_string()),
            namespace: Some("chia".to_string()),
            uid: Some("def-456".to_string()),
            ..Default::default()
        },
        spec: ChiaCASpec {
            secret_name: "chia-ca".to_string(),
            image: None,
            image_pull_policy: None,
        },
        status: None,
    }
}

fn pvc_storage(claim_name: Option<&str>, generate: bool) -> StorageSpec {
    StorageSpec {
        chia_root: Some(VolumeSourceSpec {
            persistent_volume_claim: Some(PvcSpec {
                claim_name: claim_name.map(str::to_string),
                generate,
                storage_class: None,
                size: None,
            }),
            host_path: None,
        }),
    }
}

// ============================================================================
// CHIA_ROOT Volume Resolution
// ============================================================================

#[test]
fn chia_root_volume_uses_named_claim() {
    let storage = pvc_storage(Some("my-claim"), false);
    let volume = volumes::chia_root_volume("mainnet", Some(&storage));

    assert_eq!(volume.name, volumes::CHIA_ROOT_VOLUME);
    assert_eq!(
        volume.persistent_volume_claim.unwrap().claim_name,
        "my-claim"
    );
    assert!(volume.host_path.is_none());
}

#[test]
fn chia_root_volume_pvc_wins_over_host_path() {
    let storage = StorageSpec {
        chia_root: Some(VolumeSourceSpec {
            persistent_volume_claim: Some(PvcSpec {
                claim_name: Some("my-claim".to_string()),
                generate: false,
                storage_class: None,
                size: None,
            }),
            host_path: Some(HostPathSpec {
                path: "/mnt/chia".to_string(),
            }),
        }),
    };
    let volume = volumes::chia_root_volume("mainnet", Some(&storage));

    assert!(volume.persistent_volume_claim.is_some());
    assert!(volume.host_path.is_none());
}

#[test]
fn chia_root_volume_host_path_without_pvc() {
    let storage = StorageSpec {
        chia_root: Some(VolumeSourceSpec {
            persistent_volume_claim: None,
            host_path: Some(HostPathSpec {
                path: "/mnt/chia".to_string(),
            }),
        }),
    };
    let volume = volumes::chia_root_volume("mainnet", Some(&storage));

    assert_eq!(volume.host_path.unwrap().path, "/mnt/chia");
    assert!(volume.persistent_volume_claim.is_none());
    assert!(volume.empty_dir.is_none());
}

#[test]
fn chia_root_volume_falls_back_to_empty_dir() {
    let volume = volumes::chia_root_volume("mainnet", None);

    assert!(volume.empty_dir.is_some());
    assert!(volume.persistent_volume_claim.is_none());
    assert!(volume.host_path.is_none());
}

#[test]
fn generated_claim_used_when_no_claim_name() {
    let storage = pvc_storage(None, true);
    let volume = volumes::chia_root_volume("mainnet", Some(&storage));

    assert_eq!(
        volume.persistent_volume_claim.unwrap().claim_name,
        "mainnet-chia-root"
    );
}

#[test]
fn pvc_to_generate_only_for_generate_without_claim_name() {
    assert!(volumes::pvc_to_generate(Some(&pvc_storage(None, true))).is_some());
    assert!(volumes::pvc_to_generate(Some(&pvc_storage(Some("existing"), true))).is_none());
    assert!(volumes::pvc_to_generate(Some(&pvc_storage(None, false))).is_none());
    assert!(volumes::pvc_to_generate(None).is_none());
}

// ============================================================================
// Plot Volumes
// ============================================================================

#[test]
fn plot_volumes_expand_to_volumes_and_mounts() {
    let specs = vec![
        PlotVolumeSpec {
            name: "plots1".to_string(),
            source: VolumeSourceSpec {
                persistent_volume_claim: Some(PvcSpec {
                    claim_name: Some("plots1-pvc".to_string()),
                    generate: false,
                    storage_class: None,
                    size: None,
                }),
                host_path: None,
            },
        },
        PlotVolumeSpec {
            name: "plots2".to_string(),
            source: VolumeSourceSpec {
                persistent_volume_claim: None,
                host_path: Some(HostPathSpec {
                    path: "/mnt/plots2".to_string(),
                }),
            },
        },
    ];

    let (vols, mounts) = volumes::plot_volumes(&specs).unwrap();

    assert_eq!(vols.len(), 2);
    assert_eq!(mounts.len(), 2);
    assert_eq!(mounts[0].mount_path, "/plots/plots1");
    assert_eq!(mounts[1].mount_path, "/plots/plots2");
    assert_eq!(
        volumes::plots_dir(&specs),
        "/plots/plots1:/plots/plots2"
    );
}

#[test]
fn plot_volume_without_source_is_an_error() {
    let specs = vec![PlotVolumeSpec {
        name: "plots1".to_string(),
        source: VolumeSourceSpec::default(),
    }];

    assert!(volumes::plot_volumes(&specs).is_err());
}

// ============================================================================
// Deployment / StatefulSet Assembly
// ============================================================================

#[test]
fn deployment_carries_labels_and_owner_reference() {
    let node = test_node(CommonSpec::default());
    let container = build_chia_container(&node.spec.common, "node", KEYS_NONE, vec![], vec![], vec![]);
    let deployment = build_deployment(&node, "node", &node.spec.common, container, vec![]);

    let labels = deployment.metadata.labels.as_ref().unwrap();
    assert_eq!(labels["app.kubernetes.io/name"], "chia");
    assert_eq!(labels["app.kubernetes.io/instance"], "mainnet");
    assert_eq!(labels["app.kubernetes.io/component"], "node");
    assert_eq!(labels["app.kubernetes.io/managed-by"], "chia-operator");

    let owner = &deployment.metadata.owner_references.as_ref().unwrap()[0];
    assert_eq!(owner.kind, "ChiaNode");
    assert_eq!(owner.name, "mainnet");
    assert_eq!(owner.uid, "abc-123");
    assert_eq!(owner.controller, Some(true));
    assert_eq!(owner.block_owner_deletion, Some(true));

    // selector must match pod template labels
    let spec = deployment.spec.as_ref().unwrap();
    assert_eq!(
        spec.selector.match_labels,
        spec.template.metadata.as_ref().unwrap().labels
    );
    assert_eq!(spec.replicas, Some(1));
}

#[test]
fn deployment_merges_user_labels() {
    let common = CommonSpec {
        labels: Some(BTreeMap::from([(
            "team".to_string(),
            "infra".to_string(),
        )])),
        ..Default::default()
    };
    let node = test_node(common);
    let container = build_chia_container(&node.spec.common, "node", KEYS_NONE, vec![], vec![], vec![]);
    let deployment = build_deployment(&node, "node", &node.spec.common, container, vec![]);

    let labels = deployment.metadata.labels.unwrap();
    assert_eq!(labels["team"], "infra");
    assert_eq!(labels["app.kubernetes.io/name"], "chia");
}

#[test]
fn statefulset_maps_replicas_and_headless_service() {
    let node = test_node(CommonSpec::default());
    let container = build_chia_container(
        &node.spec.common,
        "node",
        KEYS_NONE,
        vec![container_port("peer", ports::NODE_PEER)],
        vec![],
        vec![],
    );
    let sts = build_statefulset(
        &node,
        "node",
        &node.spec.common,
        container,
        vec![volumes::chia_root_volume("mainnet", None)],
        node.spec.replicas,
        "mainnet-internal".to_string(),
    );

    let spec = sts.spec.unwrap();
    assert_eq!(spec.replicas, Some(3));
    assert_eq!(spec.service_name, "mainnet-internal");

    let pod_spec = spec.template.spec.unwrap();
    assert_eq!(pod_spec.containers.len(), 1);
    assert_eq!(
        pod_spec.containers[0].image.as_deref(),
        Some(DEFAULT_CHIA_IMAGE)
    );
    assert_eq!(pod_spec.volumes.unwrap().len(), 1);
}

#[test]
fn pod_template_applies_node_selector_and_security_context() {
    let common = CommonSpec {
        node_selector: Some(BTreeMap::from([(
            "disktype".to_string(),
            "ssd".to_string(),
        )])),
        security_context: Some(chia_operator::crd::SecurityContextSpec {
            run_as_user: Some(1000),
            run_as_group: Some(1000),
            fs_group: Some(1000),
            run_as_non_root: Some(true),
        }),
        ..Default::default()
    };
    let node = test_node(common);
    let container = build_chia_container(&node.spec.common, "node", KEYS_NONE, vec![], vec![], vec![]);
    let deployment = build_deployment(&node, "node", &node.spec.common, container, vec![]);

    let pod_spec = deployment.spec.unwrap().template.spec.unwrap();
    assert_eq!(
        pod_spec.node_selector.unwrap()["disktype"],
        "ssd"
    );
    let sc = pod_spec.security_context.unwrap();
    assert_eq!(sc.run_as_user, Some(1000));
    assert_eq!(sc.run_as_non_root, Some(true));
}

#[test]
fn builders_are_deterministic() {
    let node = test_node(CommonSpec::default());
    let build = || {
        let container = build_chia_container(
            &node.spec.common,
            "node",
            KEYS_NONE,
            vec![container_port("peer", ports::NODE_PEER)],
            vec![],
            vec![],
        );
        build_deployment(&node, "node", &node.spec.common, container, vec![])
    };

    assert_eq!(build(), build());
}

// ============================================================================
// Service Assembly
// ============================================================================

#[test]
fn service_selects_component_pods() {
    let node = test_node(CommonSpec::default());
    let service = build_service(
        &node,
        "node",
        &node.spec.common,
        "mainnet-rpc".to_string(),
        vec![
            service_port("rpc", ports::NODE_RPC),
            service_port("daemon", ports::DAEMON),
        ],
    );

    assert_eq!(service.metadata.name.as_deref(), Some("mainnet-rpc"));
    assert_eq!(service.metadata.namespace.as_deref(), Some("chia"));

    let spec = service.spec.unwrap();
    // default service type left to the cluster (ClusterIP)
    assert!(spec.type_.is_none());
    let selector = spec.selector.unwrap();
    assert_eq!(selector["app.kubernetes.io/instance"], "mainnet");

    let svc_ports = spec.ports.unwrap();
    assert_eq!(svc_ports.len(), 2);
    assert_eq!(svc_ports[0].port, ports::NODE_RPC);
    assert_eq!(
        svc_ports[0].target_port,
        Some(IntOrString::Int(ports::NODE_RPC))
    );
}

#[test]
fn service_type_override_respected() {
    let common = CommonSpec {
        service_type: Some("NodePort".to_string()),
        ..Default::default()
    };
    let node = test_node(common);
    let service = build_service(
        &node,
        "node",
        &node.spec.common,
        "mainnet".to_string(),
        vec![service_port("peer", ports::NODE_PEER)],
    );

    assert_eq!(service.spec.unwrap().type_.as_deref(), Some("NodePort"));
}

// ============================================================================
// PVC Assembly
// ============================================================================

#[test]
fn generated_pvc_defaults_size() {
    let node = test_node(CommonSpec::default());
    let pvc_spec = PvcSpec {
        claim_name: None,
        generate: true,
        storage_class: None,
        size: None,
    };
    let pvc = build_pvc(
        &node,
        "node",
        &node.spec.common,
        "mainnet-chia-root".to_string(),
        &pvc_spec,
    );

    let spec = pvc.spec.unwrap();
    assert_eq!(spec.access_modes, Some(vec!["ReadWriteOnce".to_string()]));
    assert!(spec.storage_class_name.is_none());
    let requests = spec.resources.unwrap().requests.unwrap();
    assert_eq!(requests["storage"], Quantity("100Gi".to_string()));
}

#[test]
fn generated_pvc_honors_size_and_class() {
    let node = test_node(CommonSpec::default());
    let pvc_spec = PvcSpec {
        claim_name: None,
        generate: true,
        storage_class: Some("fast-ssd".to_string()),
        size: Some("500Gi".to_string()),
    };
    let pvc = build_pvc(
        &node,
        "node",
        &node.spec.common,
        "mainnet-chia-root".to_string(),
        &pvc_spec,
    );

    let spec = pvc.spec.unwrap();
    assert_eq!(spec.storage_class_name.as_deref(), Some("fast-ssd"));
    let requests = spec.resources.unwrap().requests.unwrap();
    assert_eq!(requests["storage"], Quantity("500Gi".to_string()));
}

// ============================================================================
// CA Bootstrap Assembly
// ============================================================================

#[test]
fn ca_job_runs_generator_with_secret_env() {
    let ca = test_ca();
    let job = rbac::build_ca_job(&ca);

    assert_eq!(job.metadata.name.as_deref(), Some("mainnet-ca-ca-gen"));

    let spec = job.spec.unwrap();
    assert_eq!(spec.backoff_limit, Some(rbac::CA_JOB_BACKOFF_LIMIT));

    let pod_spec = spec.template.spec.unwrap();
    assert_eq!(pod_spec.restart_policy.as_deref(), Some("Never"));
    assert_eq!(
        pod_spec.service_account_name.as_deref(),
        Some("mainnet-ca-ca-gen")
    );

    let container = &pod_spec.containers[0];
    let env = container.env.as_ref().unwrap();
    let secret_env = env.iter().find(|e| e.name == "SECRET_NAME").unwrap();
    assert_eq!(secret_env.value.as_deref(), Some("chia-ca"));
    let ns_env = env.iter().find(|e| e.name == "NAMESPACE").unwrap();
    assert_eq!(ns_env.value.as_deref(), Some("chia"));
}

#[test]
fn ca_job_image_override_respected() {
    let mut ca = test_ca();
    ca.spec.image = Some("ghcr.io/chia-network/chia-operator-ca-gen:1.2".to_string());

    let job = rbac::build_ca_job(&ca);
    let container = &job.spec.unwrap().template.spec.unwrap().containers[0];
    assert_eq!(
        container.image.as_deref(),
        Some("ghcr.io/chia-network/chia-operator-ca-gen:1.2")
    );
}

#[test]
fn ca_role_limited_to_secrets() {
    let ca = test_ca();
    let role = rbac::build_role(&ca);

    let rules = role.rules.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(
        rules[0].resources,
        Some(vec!["secrets".to_string()])
    );
    assert!(rules[0].verbs.contains(&"create".to_string()));
    assert!(!rules[0].verbs.contains(&"delete".to_string()));
}

#[test]
fn ca_bootstrap_objects_are_owner_referenced() {
    let ca = test_ca();

    for owner_refs in [
        rbac::build_service_account(&ca).metadata.owner_references,
        rbac::build_role(&ca).metadata.owner_references,
        rbac::build_role_binding(&ca).metadata.owner_references,
        rbac::build_ca_job(&ca).metadata.owner_references,
    ] {
        let owner = &owner_refs.unwrap()[0];
        assert_eq!(owner.kind, "ChiaCA");
        assert_eq!(owner.name, "mainnet-ca");
        assert_eq!(owner.controller, Some(true));
    }
}
