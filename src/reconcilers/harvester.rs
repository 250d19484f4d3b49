//! ChiaHarvester reconciler
//!
//! Harvesters mount their plot volumes read-only under /plots and hand the
//! directory list to chia via `plots_dir`.

use kube::runtime::controller::Action;
use kube::{Client, ResourceExt};

use super::node::STEADY_STATE_REQUEUE;
use super::{ensure_generated_pvc, patch_status_ready};
use crate::crd::ChiaHarvester;
use crate::error::{Error, Result};
use crate::resources::container::{build_chia_container, container_port, env_var, KEYS_NONE};
use crate::resources::workloads::{build_deployment, build_service, service_port};
use crate::resources::{self, ports, volumes};

const COMPONENT: &str = "harvester";

/// Validate the ChiaHarvester spec
pub fn validate(harvester: &ChiaHarvester) -> Result<()> {
    if harvester.spec.farmer_address.trim().is_empty() {
        return Err(Error::validation("farmerAddress must not be empty"));
    }
    if harvester.spec.common.ca_secret_name.is_none() {
        return Err(Error::validation("caSecretName is required for harvesters"));
    }
    if harvester.spec.plot_volumes.is_empty() {
        return Err(Error::validation(
            "at least one plot volume is required for harvesters",
        ));
    }
    for plot in &harvester.spec.plot_volumes {
        if plot.name.trim().is_empty() {
            return Err(Error::validation("plot volume name must not be empty"));
        }
        if plot.source.is_empty() {
            return Err(Error::validation(format!(
                "Plot volume '{}' must specify a persistentVolumeClaim or hostPath",
                plot.name
            )));
        }
    }
    Ok(())
}

/// Reconcile a ChiaHarvester
pub async fn apply(harvester: &ChiaHarvester, client: &Client, namespace: &str) -> Result<Action> {
    let common = &harvester.spec.common;
    let name = harvester.name_any();

    ensure_generated_pvc(client, harvester, COMPONENT, common, namespace).await?;

    let mut pod_volumes = vec![volumes::chia_root_volume(&name, common.storage.as_ref())];
    let mut mounts = vec![volumes::chia_root_mount()];
    if let Some(ca) = &common.ca_secret_name {
        pod_volumes.push(volumes::ca_volume(ca));
        mounts.push(volumes::ca_mount());
    }

    let (plot_vols, plot_mounts) = volumes::plot_volumes(&harvester.spec.plot_volumes)?;
    pod_volumes.extend(plot_vols);
    mounts.extend(plot_mounts);

    let extra_env = vec![
        env_var("farmer_address", &harvester.spec.farmer_address),
        env_var("farmer_port", &ports::FARMER.to_string()),
        env_var("plots_dir", &volumes::plots_dir(&harvester.spec.plot_volumes)),
    ];

    let container = build_chia_container(
        common,
        "harvester",
        KEYS_NONE,
        vec![
            container_port("harvester", ports::HARVESTER),
            container_port("rpc", ports::HARVESTER_RPC),
            container_port("daemon", ports::DAEMON),
        ],
        extra_env,
        mounts,
    );

    let deployment = build_deployment(harvester, COMPONENT, common, container, pod_volumes);
    resources::apply(client, namespace, &deployment).await?;

    let harvester_service = build_service(
        harvester,
        COMPONENT,
        common,
        name.clone(),
        vec![service_port("harvester", ports::HARVESTER)],
    );
    resources::apply(client, namespace, &harvester_service).await?;

    let rpc_service = build_service(
        harvester,
        COMPONENT,
        common,
        format!("{name}-rpc"),
        vec![
            service_port("rpc", ports::HARVESTER_RPC),
            service_port("daemon", ports::DAEMON),
        ],
    );
    resources::apply(client, namespace, &rpc_service).await?;

    patch_status_ready(
        client,
        harvester,
        "ChildrenApplied",
        "Harvester resources applied",
    )
    .await?;
    Ok(Action::requeue(STEADY_STATE_REQUEUE))
}
