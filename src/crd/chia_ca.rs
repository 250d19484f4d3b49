//! ChiaCA Custom Resource Definition
//!
//! A ChiaCA asks the operator to materialize a Secret containing a Chia
//! certificate authority key pair, generated in-cluster by a one-shot Job.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::ChiaComponentStatus;

/// Default image used by the CA generator Job
pub const DEFAULT_CA_GENERATOR_IMAGE: &str = "ghcr.io/chia-network/chia-operator-ca-gen:latest";

/// ChiaCA resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "k8s.chia.net",
    version = "v1alpha1",
    kind = "ChiaCA",
    plural = "chiacas",
    singular = "chiaca",
    shortname = "chca",
    namespaced,
    status = "ChiaComponentStatus",
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Secret", "type": "string", "jsonPath": ".spec.secretName"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChiaCASpec {
    /// Name of the Secret the generator writes the CA material into
    #[serde(default = "default_ca_secret_name")]
    pub secret_name: String,

    /// CA generator image override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Image pull policy for the generator Job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
}

fn default_ca_secret_name() -> String {
    "chia-ca".to_string()
}

impl ChiaCASpec {
    /// Effective generator image
    pub fn generator_image(&self) -> &str {
        self.image.as_deref().unwrap_or(DEFAULT_CA_GENERATOR_IMAGE)
    }
}
