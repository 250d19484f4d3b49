//! ChiaNode reconciler
//!
//! Full nodes run as a StatefulSet behind a headless Service, with separate
//! peer and RPC Services.

use std::time::Duration;

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};
use tracing::warn;

use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaNode;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, KEYS_NONE};
use crate::resources::workloads::{build_service, build_statefulset, service_port};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "node";

/// Steady-state requeue for workload kinds
pub(crate) const STEADY_STATE_REQUEUE: Duration = Duration::from_secs(300);

/// Validate the ChiaNode spec
pub fn validate(node: &ChiaNode) -> Result<()> {
    if node.spec.replicas < 1 {
        return Err(Error::validation("replicas must be at least 1"));
    }
    if node.spec.common.ca_secret_name.is_none() {
        return Err(Error::validation("caSecretName is required for full nodes"));
    }
    if let Some(peers) = &node.spec.full_node_peers {
        if peers.iter().any(|p| p.host.trim().is_empty()) {
            return Err(Error::validation("full node peer host must not be empty"));
        }
    }
    Ok(())
}

/// Reconcile a ChiaNode
pub async fn apply(node: &ChiaNode, client: &Client, namespace: &str) -> Result<Action> {
    let common = &node.spec.common;
    let name = node.name_any();

    ensure_generated_pvc(client, node, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![volumes::chia_root_volume(&name, common.storage.as_ref())];
    let mut mounts = vec![volumes::chia_root_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let mut extra_env = Vec::new();
    // The peer list is advisory: a marshal failure only drops the env var.
    if let Some(peers) = &node.spec.full_node_peers {
        match serde_json::to_string(peers) {
            Ok(json) => extra_env.push(env_var("full_node_peers", &json)),
            Err(e) => warn!(name = %name, error = %e, "Failed to serialize full node peers, omitting"),
        }
    }

    let peer_port = if common.testnet {
        ports::NODE_PEER_TESTNET
    } else {
        ports::NODE_PEER
    };

    let container = build_chia_container(
        common,
        "node",
        KEYS_NONE,
        vec![
            container_port("peer", peer_port),
            container_port("rpc", ports::NODE_RPC),
            container_port("daemon", ports::DAEMON),
        ],
        extra_env,
        mounts,
    );

    let headless_name = format!("{name}-headless");
    let mut headless = build_service(
        node,
        COMPONENT,
        common,
        headless_name.clone(),
        vec![service_port("peer", peer_port)],
    );
    if let Some(spec) = &mut headless.spec {
        spec.cluster_ip = Some("None".to_string());
        spec.type_ = None;
    }
    resources::apply(client, namespace, &headless).await?;

    let statefulset = build_statefulset(
        node,
        COMPONENT,
        common,
        container,
        pod_volumes,
        node.spec.replicas,
        headless_name,
    );
    resources::apply(client, namespace, &statefulset).await?;

    let peer_service = build_service(
        node,
        COMPONENT,
        common,
        name.clone(),
        vec![service_port("peer", peer_port)],
    );
    resources::apply(client, namespace, &peer_service).await?;

    let rpc_service = build_service(
        node,
        COMPONENT,
        common,
        format!("{name}-rpc"),
        vec![
            service_port("rpc", ports::NODE_RPC),
            service_port("daemon", ports::DAEMON),
        ],
    );
    resources::apply(client, namespace, &rpc_service).await?;

    patch_status_ready(client, node, "ChildrenApplied", "Full node resources applied").await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
