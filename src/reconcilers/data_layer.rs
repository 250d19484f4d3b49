//! ChiaDataLayer reconciler
//!
//! Runs the data layer service with its wallet, optionally alongside the
//! HTTP file server on a second Service.

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};

use super::node::STEADY_STATE_REQUEUE;
use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaDataLayer;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, mnemonic_path};
use crate::resources::workloads::{build_deployment, build_service, service_port};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "data-layer";

/// Validate the ChiaDataLayer spec
pub fn validate(data_layer: &ChiaDataLayer) -> Result<()> {
    if data_layer.spec.full_node_peer.trim().is_empty() {
        return Err(Error::validation("fullNodePeer must not be empty"));
    }
    if data_layer.spec.secret_key.name.trim().is_empty() {
        return Err(Error::validation("secretKey.name must not be empty"));
    }
    if data_layer.spec.common.ca_secret_name.is_none() {
        return Err(Error::validation(
            "caSecretName is required for data layer services",
        ));
    }
    Ok(())
}

/// Reconcile a ChiaDataLayer
pub async fn apply(data_layer: &ChiaDataLayer, client: &Client, namespace: &str) -> Result<Action> {
    let common = &data_layer.spec.common;
    let name = data_layer.name_any();

    ensure_generated_pvc(client, data_layer, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![
        volumes::chia_root_volume(&name, common.storage.as_ref()),
        volumes::key_volume(&data_layer.spec.secret_key.name),
    ];
    let mut mounts = vec![volumes::chia_root_mount(), volumes::key_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let service_env = if data_layer.spec.enable_http {
        "data data_layer_http"
    } else {
        "data"
    };

    let mut container_ports = vec![
        container_port("rpc", ports::DATA_LAYER_RPC),
        container_port("daemon", ports::DAEMON),
    ];
    if data_layer.spec.enable_http {
        container_ports.push(container_port("http", ports::DATA_LAYER_HTTP));
    }

    let container = build_chia_container(
        common,
        service_env,
        &mnemonic_path(&data_layer.spec.secret_key.key),
        container_ports,
        vec![env_var("full_node_peer", &data_layer.spec.full_node_peer)],
        mounts,
    );

    let deployment = build_deployment(data_layer, COMPONENT, common, container, pod_volumes);
    resources::apply(client, namespace, &deployment).await?;

    let rpc_service = build_service(
        data_layer,
        COMPONENT,
        common,
        format!("{name}-rpc"),
        vec![
            service_port("rpc", ports::DATA_LAYER_RPC),
            service_port("daemon", ports::DAEMON),
        ],
    );
    resources::apply(client, namespace, &rpc_service).await?;

    if data_layer.spec.enable_http {
        let http_service = build_service(
            data_layer,
            COMPONENT,
            common,
            format!("{name}-http"),
            vec![service_port("http", ports::DATA_LAYER_HTTP)],
        );
        resources::apply(client, namespace, &http_service).await?;
    }

    patch_status_ready(
        client,
        data_layer,
        "ChildrenApplied",
        "Data layer resources applied",
    )
    .await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
