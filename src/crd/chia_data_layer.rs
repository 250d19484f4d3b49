//! ChiaDataLayer Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChiaComponentStatus, CommonSpec, SecretKeyRef};

/// ChiaDataLayer resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "k8s.chia.net",
    version = "v1alpha1",
    kind = "ChiaDataLayer",
    plural = "chiadatalayers",
    singular = "chiadatalayer",
    shortname = "chdatalayer",
    namespaced,
    status = "ChiaComponentStatus",
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChiaDataLayerSpec {
    /// Shared Chia component configuration
    #[serde(flatten)]
    pub common: CommonSpec,

    /// Address of the full node to sync from (host:port)
    pub full_node_peer: String,

    /// Reference to the Secret key holding the data layer wallet mnemonic
    pub secret_key: SecretKeyRef,

    /// Also run the data layer HTTP file server
    #[serde(default = "default_true")]
    pub enable_http: bool,
}

fn default_true() -> bool {
    true
}
