//! ChiaCrawler reconciler
//!
//! Crawlers hold no keys, so the CA secret is optional for this kind.

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};

use super::node::STEADY_STATE_REQUEUE;
use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaCrawler;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, KEYS_NONE};
use crate::resources::workloads::{build_deployment, build_service, service_port};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "crawler";

/// Validate the ChiaCrawler spec
pub fn validate(crawler: &ChiaCrawler) -> Result<()> {
    if let Some(peer) = &crawler.spec.bootstrap_peer {
        if peer.trim().is_empty() {
            return Err(Error::validation("bootstrapPeer must not be empty when set"));
        }
    }
    Ok(())
}

/// Reconcile a ChiaCrawler
pub async fn apply(crawler: &ChiaCrawler, client: &Client, namespace: &str) -> Result<Action> {
    let common = &crawler.spec.common;
    let name = crawler.name_any();

    ensure_generated_pvc(client, crawler, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![volumes::chia_root_volume(&name, common.storage.as_ref())];
    let mut mounts = vec![volumes::chia_root_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let mut extra_env = Vec::new();
    if let Some(peer) = &crawler.spec.bootstrap_peer {
        extra_env.push(env_var("crawler_bootstrap_peers", peer));
    }

    let container = build_chia_container(
        common,
        "crawler",
        KEYS_NONE,
        vec![container_port("rpc", ports::CRAWLER_RPC)],
        extra_env,
        mounts,
    );

    let deployment = build_deployment(crawler, COMPONENT, common, container, pod_volumes);
    resources::apply(client, namespace, &deployment).await?;

    let rpc_service = build_service(
        crawler,
        COMPONENT,
        common,
        format!("{name}-rpc"),
        vec![service_port("rpc", ports::CRAWLER_RPC)],
    );
    resources::apply(client, namespace, &rpc_service).await?;

    patch_status_ready(
        client,
        crawler,
        "ChildrenApplied",
        "Crawler resources applied",
    )
    .await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
