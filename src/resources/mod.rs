//! Kubernetes child-object assembly for Chia components
//!
//! Pure builder functions that map a CRD spec to the Deployments,
//! StatefulSets, Services, PVCs, Jobs, and RBAC objects the operator manages,
//! plus the apply helpers that converge them. Builders take the custom
//! resource and return fully-formed `k8s_openapi` structs; all cluster I/O
//! goes through [`apply`] and [`create_if_absent`].

pub mod container;
pub mod rbac;
pub mod volumes;
pub mod workloads;

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::OnceLock;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::crd::CommonSpec;
use crate::error::{Error, Result};

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "chia-operator";

/// Default Chia container image, overridable per resource
pub const DEFAULT_CHIA_IMAGE: &str = "ghcr.io/chia-network/chia:latest";

static DEFAULT_IMAGE: OnceLock<String> = OnceLock::new();

/// Operator-wide default image: CHIA_DEFAULT_IMAGE from the environment,
/// falling back to [`DEFAULT_CHIA_IMAGE`]. Read once.
pub fn default_image() -> &'static str {
    DEFAULT_IMAGE.get_or_init(|| {
        std::env::var("CHIA_DEFAULT_IMAGE").unwrap_or_else(|_| DEFAULT_CHIA_IMAGE.to_string())
    })
}

/// Mainnet default ports for the managed Chia services
pub mod ports {
    /// Full node peer protocol
    pub const NODE_PEER: i32 = 8444;
    /// Full node RPC
    pub const NODE_RPC: i32 = 8555;
    /// Farmer peer protocol
    pub const FARMER: i32 = 8447;
    /// Farmer RPC
    pub const FARMER_RPC: i32 = 8559;
    /// Harvester peer protocol
    pub const HARVESTER: i32 = 8448;
    /// Harvester RPC
    pub const HARVESTER_RPC: i32 = 8560;
    /// Wallet RPC
    pub const WALLET_RPC: i32 = 9256;
    /// Timelord peer protocol
    pub const TIMELORD: i32 = 8446;
    /// Timelord RPC
    pub const TIMELORD_RPC: i32 = 8557;
    /// Crawler RPC (also used by the seeder)
    pub const CRAWLER_RPC: i32 = 8561;
    /// Seeder DNS, TCP and UDP
    pub const SEEDER_DNS: i32 = 53;
    /// Introducer peer protocol
    pub const INTRODUCER: i32 = 8445;
    /// Data layer RPC
    pub const DATA_LAYER_RPC: i32 = 8562;
    /// Data layer HTTP file server
    pub const DATA_LAYER_HTTP: i32 = 8575;
    /// Chia daemon
    pub const DAEMON: i32 = 55400;
    /// Full node peer protocol on testnets
    pub const NODE_PEER_TESTNET: i32 = 58444;
}

/// Standard labels for a component's generated objects, merged with any
/// user-supplied extra labels from the common spec
pub fn standard_labels<K>(
    obj: &K,
    component: &str,
    common: Option<&CommonSpec>,
) -> BTreeMap<String, String>
where
    K: Resource<DynamicType = ()>,
{
    let mut labels = BTreeMap::new();
    labels.insert("app.kubernetes.io/name".to_string(), "chia".to_string());
    labels.insert("app.kubernetes.io/instance".to_string(), obj.name_any());
    labels.insert(
        "app.kubernetes.io/component".to_string(),
        component.to_string(),
    );
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "chia-operator".to_string(),
    );
    if let Some(extra) = common.and_then(|c| c.labels.as_ref()) {
        for (k, v) in extra {
            labels.insert(k.clone(), v.clone());
        }
    }
    labels
}

/// Extra annotations from the common spec, or None when empty
pub fn extra_annotations(common: Option<&CommonSpec>) -> Option<BTreeMap<String, String>> {
    common
        .and_then(|c| c.annotations.clone())
        .filter(|a| !a.is_empty())
}

/// Create an OwnerReference so children are garbage-collected with the parent
pub fn owner_reference<K>(obj: &K) -> OwnerReference
where
    K: Resource<DynamicType = ()>,
{
    OwnerReference {
        api_version: K::api_version(&()).to_string(),
        kind: K::kind(&()).to_string(),
        name: obj.name_any(),
        uid: obj.meta().uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Server-side apply an object, creating or updating it as needed
pub async fn apply<K>(client: &Client, namespace: &str, obj: &K) -> Result<()>
where
    K: Resource<Scope = NamespaceResourceScope> + Serialize + Clone + DeserializeOwned + Debug,
    K::DynamicType: Default,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let name = obj
        .meta()
        .name
        .clone()
        .ok_or(Error::MissingObjectKey("metadata.name"))?;

    debug!(name = %name, "Applying object");
    api.patch(
        &name,
        &PatchParams::apply(FIELD_MANAGER).force(),
        &Patch::Apply(obj),
    )
    .await?;

    Ok(())
}

/// Create an object only if it does not exist yet.
///
/// Used for immutable children (PVCs, Jobs) where server-side apply would
/// either fail or fight the API server. Returns true when the object was
/// created by this call.
pub async fn create_if_absent<K>(client: &Client, namespace: &str, obj: &K) -> Result<bool>
where
    K: Resource<Scope = NamespaceResourceScope> + Serialize + Clone + DeserializeOwned + Debug,
    K::DynamicType: Default,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let name = obj
        .meta()
        .name
        .clone()
        .ok_or(Error::MissingObjectKey("metadata.name"))?;

    match api.get(&name).await {
        Ok(_) => {
            debug!(name = %name, "Object already exists, skipping");
            Ok(false)
        }
        Err(kube::Error::Api(e)) if e.code == 404 => {
            info!(name = %name, "Creating object");
            api.create(&PostParams::default(), obj).await?;
            Ok(true)
        }
        Err(e) => Err(Error::Kube(e)),
    }
}
