//! ChiaWallet reconciler

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};

use super::node::STEADY_STATE_REQUEUE;
use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaWallet;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, mnemonic_path};
use crate::resources::workloads::{build_deployment, build_service, service_port};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "wallet";

/// Validate the ChiaWallet spec
pub fn validate(wallet: &ChiaWallet) -> Result<()> {
    if wallet.spec.full_node_peer.trim().is_empty() {
        return Err(Error::validation("fullNodePeer must not be empty"));
    }
    if wallet.spec.secret_key.name.trim().is_empty() {
        return Err(Error::validation("secretKey.name must not be empty"));
    }
    if wallet.spec.common.ca_secret_name.is_none() {
        return Err(Error::validation("caSecretName is required for wallets"));
    }
    Ok(())
}

/// Reconcile a ChiaWallet
pub async fn apply(wallet: &ChiaWallet, client: &Client, namespace: &str) -> Result<Action> {
    let common = &wallet.spec.common;
    let name = wallet.name_any();

    ensure_generated_pvc(client, wallet, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![
        volumes::chia_root_volume(&name, common.storage.as_ref()),
        volumes::key_volume(&wallet.spec.secret_key.name),
    ];
    let mut mounts = vec![volumes::chia_root_mount(), volumes::key_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let container = build_chia_container(
        common,
        "wallet",
        &mnemonic_path(&wallet.spec.secret_key.key),
        vec![
            container_port("rpc", ports::WALLET_RPC),
            container_port("daemon", ports::DAEMON),
        ],
        vec![env_var("full_node_peer", &wallet.spec.full_node_peer)],
        mounts,
    );

    let deployment = build_deployment(wallet, COMPONENT, common, container, pod_volumes);
    resources::apply(client, namespace, &deployment).await?;

    let rpc_service = build_service(
        wallet,
        COMPONENT,
        common,
        format!("{name}-rpc"),
        vec![
            service_port("rpc", ports::WALLET_RPC),
            service_port("daemon", ports::DAEMON),
        ],
    );
    resources::apply(client, namespace, &rpc_service).await?;

    patch_status_ready(client, wallet, "ChildrenApplied", "Wallet resources applied").await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
