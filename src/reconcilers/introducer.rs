//! ChiaIntroducer reconciler
//!
//! Introducers hold no keys, so the CA secret is optional for this kind.

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};

use super::node::STEADY_STATE_REQUEUE;
use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaIntroducer;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, KEYS_NONE};
use crate::resources::workloads::{build_deployment, build_service, service_port};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "introducer";

/// Validate the ChiaIntroducer spec
pub fn validate(introducer: &ChiaIntroducer) -> Result<()> {
    if let Some(port) = introducer.spec.port {
        if port == 0 {
            return Err(Error::validation("port must be non-zero"));
        }
    }
    Ok(())
}

/// Reconcile a ChiaIntroducer
pub async fn apply(
    introducer: &ChiaIntroducer,
    client: &Client,
    namespace: &str,
) -> Result<Action> {
    let common = &introducer.spec.common;
    let name = introducer.name_any();

    ensure_generated_pvc(client, introducer, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![volumes::chia_root_volume(&name, common.storage.as_ref())];
    let mut mounts = vec![volumes::chia_root_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let port = introducer
        .spec
        .port
        .map(i32::from)
        .unwrap_or(ports::INTRODUCER);

    let mut extra_env = Vec::new();
    if introducer.spec.port.is_some() {
        extra_env.push(env_var("introducer_port", &port.to_string()));
    }

    let container = build_chia_container(
        common,
        "introducer",
        KEYS_NONE,
        vec![container_port("introducer", port)],
        extra_env,
        mounts,
    );

    let deployment = build_deployment(introducer, COMPONENT, common, container, pod_volumes);
    resources::apply(client, namespace, &deployment).await?;

    let service = build_service(
        introducer,
        COMPONENT,
        common,
        name,
        vec![service_port("introducer", port)],
    );
    resources::apply(client, namespace, &service).await?;

    patch_status_ready(
        client,
        introducer,
        "ChildrenApplied",
        "Introducer resources applied",
    )
    .await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
