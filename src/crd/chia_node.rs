//! ChiaNode Custom Resource Definition
//!
//! A ChiaNode runs one or more Chia full nodes as a StatefulSet with peer,
//! RPC, and daemon Services.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChiaComponentStatus, CommonSpec};

/// ChiaNode resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "k8s.chia.net",
    version = "v1alpha1",
    kind = "ChiaNode",
    plural = "chianodes",
    singular = "chianode",
    shortname = "chnode",
    namespaced,
    status = "ChiaComponentStatus",
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Replicas", "type": "integer", "jsonPath": ".spec.replicas"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChiaNodeSpec {
    /// Shared Chia component configuration
    #[serde(flatten)]
    pub common: CommonSpec,

    /// Number of full node replicas
    #[serde(default = "default_replicas")]
    pub replicas: i32,

    /// Known full node peers to connect to on startup (host:port)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_node_peers: Option<Vec<PeerSpec>>,
}

fn default_replicas() -> i32 {
    1
}

/// A full node peer address
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeerSpec {
    /// Peer hostname or IP
    pub host: String,

    /// Peer port
    pub port: u16,
}
