//! ChiaSeeder reconciler
//!
//! The seeder's DNS Service exposes port 53 over both TCP and UDP; the
//! crawler RPC rides on a separate Service.

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};

use super::node::STEADY_STATE_REQUEUE;
use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaSeeder;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, KEYS_NONE};
use crate::resources::workloads::{build_deployment, build_service, service_port, service_port_udp};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "seeder";

/// Validate the ChiaSeeder spec
pub fn validate(seeder: &ChiaSeeder) -> Result<()> {
    if seeder.spec.domain_name.trim().is_empty() {
        return Err(Error::validation("domainName must not be empty"));
    }
    if seeder.spec.nameserver.trim().is_empty() {
        return Err(Error::validation("nameserver must not be empty"));
    }
    if seeder.spec.common.ca_secret_name.is_none() {
        return Err(Error::validation("caSecretName is required for seeders"));
    }
    Ok(())
}

/// Reconcile a ChiaSeeder
pub async fn apply(seeder: &ChiaSeeder, client: &Client, namespace: &str) -> Result<Action> {
    let common = &seeder.spec.common;
    let name = seeder.name_any();

    ensure_generated_pvc(client, seeder, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![volumes::chia_root_volume(&name, common.storage.as_ref())];
    let mut mounts = vec![volumes::chia_root_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let mut extra_env = vec![
        env_var("seeder_domain_name", &seeder.spec.domain_name),
        env_var("seeder_nameserver", &seeder.spec.nameserver),
        env_var("seeder_soa_rname", &seeder.spec.rname),
    ];
    if let Some(peer) = &seeder.spec.bootstrap_peer {
        extra_env.push(env_var("seeder_bootstrap_peers", peer));
    }
    if let Some(height) = seeder.spec.minimum_height {
        extra_env.push(env_var("seeder_minimum_height", &height.to_string()));
    }

    let container = build_chia_container(
        common,
        "seeder",
        KEYS_NONE,
        vec![
            container_port("dns", ports::SEEDER_DNS),
            container_port("rpc", ports::CRAWLER_RPC),
        ],
        extra_env,
        mounts,
    );

    let deployment = build_deployment(seeder, COMPONENT, common, container, pod_volumes);
    resources::apply(client, namespace, &deployment).await?;

    let dns_service = build_service(
        seeder,
        COMPONENT,
        common,
        name.clone(),
        vec![
            service_port("dns-tcp", ports::SEEDER_DNS),
            service_port_udp("dns-udp", ports::SEEDER_DNS),
        ],
    );
    resources::apply(client, namespace, &dns_service).await?;

    let rpc_service = build_service(
        seeder,
        COMPONENT,
        common,
        format!("{name}-rpc"),
        vec![service_port("rpc", ports::CRAWLER_RPC)],
    );
    resources::apply(client, namespace, &rpc_service).await?;

    patch_status_ready(client, seeder, "ChildrenApplied", "Seeder resources applied").await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
