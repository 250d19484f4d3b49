//! ChiaFarmer Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChiaComponentStatus, CommonSpec, SecretKeyRef};

/// ChiaFarmer resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "k8s.chia.net",
    version = "v1alpha1",
    kind = "ChiaFarmer",
    plural = "chiafarmers",
    singular = "chiafarmer",
    shortname = "chfarmer",
    namespaced,
    status = "ChiaComponentStatus",
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Full Node Peer", "type": "string", "jsonPath": ".spec.fullNodePeer"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChiaFarmerSpec {
    /// Shared Chia component configuration
    #[serde(flatten)]
    pub common: CommonSpec,

    /// Address of the full node to farm against (host:port)
    pub full_node_peer: String,

    /// Reference to the Secret key holding the farmer mnemonic
    pub secret_key: SecretKeyRef,
}
