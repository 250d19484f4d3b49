//! ChiaSeeder Custom Resource Definition
//!
//! A seeder crawls the network and answers DNS queries with healthy peer
//! addresses, so its Service exposes port 53 over both TCP and UDP.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChiaComponentStatus, CommonSpec};

/// ChiaSeeder resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "k8s.chia.net",
    version = "v1alpha1",
    kind = "ChiaSeeder",
    plural = "chiaseeders",
    singular = "chiaseeder",
    shortname = "chseeder",
    namespaced,
    status = "ChiaComponentStatus",
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Domain", "type": "string", "jsonPath": ".spec.domainName"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChiaSeederSpec {
    /// Shared Chia component configuration
    #[serde(flatten)]
    pub common: CommonSpec,

    /// Domain the seeder serves DNS records for (e.g. seeder.example.com.)
    pub domain_name: String,

    /// Nameserver hostname answering for the domain
    pub nameserver: String,

    /// SOA rname (responsible party mailbox)
    #[serde(default = "default_rname")]
    pub rname: String,

    /// Peer used to bootstrap the crawl (host:port)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_peer: Option<String>,

    /// Minimum peer height before a peer is advertised
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_height: Option<u32>,
}

fn default_rname() -> String {
    "hostmaster".to_string()
}
