//! Reconcilers for Chia component CRDs
//!
//! Business logic for each kind: validate the spec, assemble the child
//! objects through the `resources` builders, apply them, and patch the
//! Status subresource. The operator only ever mutates Status on its own
//! custom resources.

pub mod ca;
pub mod crawler;
pub mod data_layer;
pub mod farmer;
pub mod harvester;
pub mod introducer;
pub mod node;
pub mod seeder;
pub mod timelord;
pub mod wallet;

use std::fmt::Debug;

use chrono::Utc;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::crd::CommonSpec;
use crate::error::Result;
use crate::resources::{self, volumes, workloads, FIELD_MANAGER};

/// Create the generated CHIA_ROOT claim for a component when its storage
/// spec asks for one. PVCs are immutable, so this is create-if-absent.
pub(crate) async fn ensure_generated_pvc<K>(
    client: &Client,
    obj: &K,
    component: &str,
    common: &CommonSpec,
    namespace: &str,
) -> Result<()>
where
    K: Resource<DynamicType = ()>,
{
    if let Some(pvc_spec) = volumes::pvc_to_generate(common.storage.as_ref()) {
        let name = volumes::generated_claim_name(&obj.name_any());
        let pvc = workloads::build_pvc(obj, component, common, name, pvc_spec);
        resources::create_if_absent(client, namespace, &pvc).await?;
    }
    Ok(())
}

/// Patch a component's status to Ready
pub async fn patch_status_ready<K>(
    client: &Client,
    obj: &K,
    reason: &str,
    message: &str,
) -> Result<()>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Debug,
{
    patch_status(client, obj, true, reason, message).await
}

/// Patch a component's status to not-Ready with a failure condition
pub async fn patch_status_failed<K>(
    client: &Client,
    obj: &K,
    reason: &str,
    message: &str,
) -> Result<()>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Debug,
{
    patch_status(client, obj, false, reason, message).await
}

async fn patch_status<K>(
    client: &Client,
    obj: &K,
    ready: bool,
    reason: &str,
    message: &str,
) -> Result<()>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Debug,
{
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<K> = Api::namespaced(client.clone(), &namespace);

    let status = json!({
        "status": {
            "ready": ready,
            "message": message,
            "observedGeneration": obj.meta().generation,
            "conditions": [{
                "type": "Ready",
                "status": if ready { "True" } else { "False" },
                "lastTransitionTime": Utc::now(),
                "reason": reason,
                "message": message
            }]
        }
    });

    api.patch_status(
        &obj.name_any(),
        &PatchParams::apply(FIELD_MANAGER),
        &Patch::Merge(status),
    )
    .await?;

    Ok(())
}
