//! ChiaCrawler Custom Resource Definition
//!
//! A crawler walks the peer graph and records reachable nodes. Like the
//! introducer it does not hold keys, so the CA secret is optional.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChiaComponentStatus, CommonSpec};

/// ChiaCrawler resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "k8s.chia.net",
    version = "v1alpha1",
    kind = "ChiaCrawler",
    plural = "chiacrawlers",
    singular = "chiacrawler",
    shortname = "chcrawler",
    namespaced,
    status = "ChiaComponentStatus",
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChiaCrawlerSpec {
    /// Shared Chia component configuration
    #[serde(flatten)]
    pub common: CommonSpec,

    /// Peer used to bootstrap the crawl (host:port)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_peer: Option<String>,
}
