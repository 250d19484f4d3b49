//! ChiaTimelord reconciler

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};

use super::node::STEADY_STATE_REQUEUE;
use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaTimelord;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, KEYS_NONE};
use crate::resources::workloads::{build_deployment, build_service, service_port};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "timelord";

/// Validate the ChiaTimelord spec
pub fn validate(timelord: &ChiaTimelord) -> Result<()> {
    if timelord.spec.full_node_peer.trim().is_empty() {
        return Err(Error::validation("fullNodePeer must not be empty"));
    }
    if timelord.spec.common.ca_secret_name.is_none() {
        return Err(Error::validation("caSecretName is required for timelords"));
    }
    Ok(())
}

/// Reconcile a ChiaTimelord
pub async fn apply(timelord: &ChiaTimelord, client: &Client, namespace: &str) -> Result<Action> {
    let common = &timelord.spec.common;
    let name = timelord.name_any();

    ensure_generated_pvc(client, timelord, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![volumes::chia_root_volume(&name, common.storage.as_ref())];
    let mut mounts = vec![volumes::chia_root_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let container = build_chia_container(
        common,
        "timelord-only timelord-launcher-only",
        KEYS_NONE,
        vec![
            container_port("timelord", ports::TIMELORD),
            container_port("rpc", ports::TIMELORD_RPC),
            container_port("daemon", ports::DAEMON),
        ],
        vec![env_var("full_node_peer", &timelord.spec.full_node_peer)],
        mounts,
    );

    let deployment = build_deployment(timelord, COMPONENT, common, container, pod_volumes);
    resources::apply(client, namespace, &deployment).await?;

    let timelord_service = build_service(
        timelord,
        COMPONENT,
        common,
        name.clone(),
        vec![service_port("timelord", ports::TIMELORD)],
    );
    resources::apply(client, namespace, &timelord_service).await?;

    let rpc_service = build_service(
        timelord,
        COMPONENT,
        common,
        format!("{name}-rpc"),
        vec![
            service_port("rpc", ports::TIMELORD_RPC),
            service_port("daemon", ports::DAEMON),
        ],
    );
    resources::apply(client, namespace, &rpc_service).await?;

    patch_status_ready(
        client,
        timelord,
        "ChildrenApplied",
        "Timelord resources applied",
    )
    .await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
