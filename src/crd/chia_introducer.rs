//! ChiaIntroducer Custom Resource Definition
//!
//! Introducers hand out initial peer lists to new nodes. They do not farm or
//! hold keys, so the CA secret is optional for this kind.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChiaComponentStatus, CommonSpec};

/// ChiaIntroducer resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "k8s.chia.net",
    version = "v1alpha1",
    kind = "ChiaIntroducer",
    plural = "chiaintroducers",
    singular = "chiaintroducer",
    shortname = "chintroducer",
    namespaced,
    status = "ChiaComponentStatus",
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChiaIntroducerSpec {
    /// Shared Chia component configuration
    #[serde(flatten)]
    pub common: CommonSpec,

    /// Introducer listen port override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}
