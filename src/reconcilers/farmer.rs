//! ChiaFarmer reconciler

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};

use super::node::STEADY_STATE_REQUEUE;
use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaFarmer;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, mnemonic_path};
use crate::resources::workloads::{build_deployment, build_service, service_port};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "farmer";

/// Validate the ChiaFarmer spec
pub fn validate(farmer: &ChiaFarmer) -> Result<()> {
    if farmer.spec.full_node_peer.trim().is_empty() {
        return Err(Error::validation("fullNodePeer must not be empty"));
    }
    if farmer.spec.secret_key.name.trim().is_empty() {
        return Err(Error::validation("secretKey.name must not be empty"));
    }
    if farmer.spec.common.ca_secret_name.is_none() {
        return Err(Error::validation("caSecretName is required for farmers"));
    }
    Ok(())
}

/// Reconcile a ChiaFarmer
pub async fn apply(farmer: &ChiaFarmer, client: &Client, namespace: &str) -> Result<Action> {
    let common = &farmer.spec.common;
    let name = farmer.name_any();

    ensure_generated_pvc(client, farmer, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![
        volumes::chia_root_volume(&name, common.storage.as_ref()),
        volumes::key_volume(&farmer.spec.secret_key.name),
    ];
    let mut mounts = vec![volumes::chia_root_mount(), volumes::key_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let container = build_chia_container(
        common,
        "farmer-only",
        &mnemonic_path(&farmer.spec.secret_key.key),
        vec![
            container_port("farmer", ports::FARMER),
            container_port("rpc", ports::FARMER_RPC),
            container_port("daemon", ports::DAEMON),
        ],
        vec![env_var("full_node_peer", &farmer.spec.full_node_peer)],
        mounts,
    );

    let deployment = build_deployment(farmer, COMPONENT, common, container, pod_volumes);
    resources::apply(client, namespace, &deployment).await?;

    let farmer_service = build_service(
        farmer,
        COMPONENT,
        common,
        name.clone(),
        vec![service_port("farmer", ports::FARMER)],
    );
    resources::apply(client, namespace, &farmer_service).await?;

    let rpc_service = build_service(
        farmer,
        COMPONENT,
        common,
        format!("{name}-rpc"),
        vec![
            service_port("rpc", ports::FARMER_RPC),
            service_port("daemon", ports::DAEMON),
        ],
    );
    resources::apply(client, namespace, &rpc_service).await?;

    patch_status_ready(client, farmer, "ChildrenApplied", "Farmer resources applied").await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
