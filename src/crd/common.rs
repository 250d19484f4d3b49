//! Spec and status blocks shared by every Chia component kind
//!
//! Each component CRD flattens [`CommonSpec`] into its own spec, mirroring
//! how the chia services share container/image/network configuration. The
//! status subresource is the same shape for all kinds: a `ready` flag plus
//! standard conditions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration shared by all Chia component kinds
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommonSpec {
    /// Container image. Defaults to the operator-wide Chia image when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Image pull policy (Always, IfNotPresent, Never)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,

    /// Chia network name (e.g. mainnet, testnet11)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Run against a testnet
    #[serde(default)]
    pub testnet: bool,

    /// Container timezone (TZ)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Chia log level (e.g. INFO, WARNING, DEBUG)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Kubernetes Service type for generated Services (ClusterIP, NodePort, LoadBalancer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,

    /// Name of the Secret holding the Chia certificate authority.
    /// Required for all kinds except introducers and crawlers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_secret_name: Option<String>,

    /// Compute resource limits and requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesSpec>,

    /// Pod security context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContextSpec>,

    /// Node selector for pod scheduling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Enable TCP liveness/readiness probes on the component port
    #[serde(default = "default_true")]
    pub probes_enabled: bool,

    /// Extra labels applied to all generated objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Extra annotations applied to all generated objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    /// CHIA_ROOT storage configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,
}

fn default_true() -> bool {
    true
}

impl Default for CommonSpec {
    fn default() -> Self {
        Self {
            image: None,
            image_pull_policy: None,
            network: None,
            testnet: false,
            timezone: None,
            log_level: None,
            service_type: None,
            ca_secret_name: None,
            resources: None,
            security_context: None,
            node_selector: None,
            probes_enabled: default_true(),
            labels: None,
            annotations: None,
            storage: None,
        }
    }
}

/// Compute resources for the chia container
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesSpec {
    /// Resource limits (e.g. cpu: "2", memory: "4Gi")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<BTreeMap<String, String>>,

    /// Resource requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<BTreeMap<String, String>>,
}

/// Pod-level security context
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContextSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_group: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_non_root: Option<bool>,
}

/// Storage configuration for a component
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    /// Backing volume for CHIA_ROOT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chia_root: Option<VolumeSourceSpec>,
}

/// A user-selectable volume source: a PVC, a hostPath, or neither (emptyDir).
///
/// When both a PVC and a hostPath are given, the PVC wins.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSourceSpec {
    /// PersistentVolumeClaim source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim: Option<PvcSpec>,

    /// hostPath source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_path: Option<HostPathSpec>,
}

impl VolumeSourceSpec {
    /// True when neither a PVC nor a hostPath is configured
    pub fn is_empty(&self) -> bool {
        self.persistent_volume_claim.is_none() && self.host_path.is_none()
    }
}

/// PersistentVolumeClaim volume source
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PvcSpec {
    /// Name of an existing claim. When unset and `generate` is true, the
    /// operator creates a claim named `<resource>-chia-root`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_name: Option<String>,

    /// Ask the operator to create the claim
    #[serde(default)]
    pub generate: bool,

    /// Storage class for a generated claim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Size of a generated claim (e.g. "300Gi")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// hostPath volume source
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostPathSpec {
    /// Path on the host
    pub path: String,
}

/// Reference to a key within a Kubernetes Secret (e.g. the farmer mnemonic)
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyRef {
    /// Secret name
    pub name: String,

    /// Key within the secret
    #[serde(default = "default_mnemonic_key")]
    pub key: String,
}

fn default_mnemonic_key() -> String {
    "mnemonic".to_string()
}

/// A named plot volume for harvesters
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlotVolumeSpec {
    /// Volume name, also used for the mount directory under /plots
    pub name: String,

    /// Volume source (PVC wins over hostPath)
    #[serde(flatten)]
    pub source: VolumeSourceSpec,
}

/// Status shared by all Chia component kinds
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChiaComponentStatus {
    /// True once the component's children have been applied (for ChiaCA,
    /// once the CA secret exists)
    #[serde(default)]
    pub ready: bool,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Observed generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Status conditions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<StatusCondition>,
}

/// Status condition
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    /// Condition type
    #[serde(rename = "type")]
    pub type_: String,

    /// Status (True, False, Unknown)
    pub status: String,

    /// Last transition time
    pub last_transition_time: DateTime<Utc>,

    /// Reason for the condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_spec_defaults_from_empty_yaml() {
        let common: CommonSpec = serde_yaml::from_str("{}").unwrap();
        assert!(common.image.is_none());
        assert!(!common.testnet);
        assert!(common.probes_enabled);
        assert!(common.ca_secret_name.is_none());
    }

    #[test]
    fn volume_source_empty_detection() {
        let source = VolumeSourceSpec::default();
        assert!(source.is_empty());

        let source = VolumeSourceSpec {
            host_path: Some(HostPathSpec {
                path: "/plots".to_string(),
            }),
            ..Default::default()
        };
        assert!(!source.is_empty());
    }

    #[test]
    fn secret_key_ref_defaults_mnemonic_key() {
        let key_ref: SecretKeyRef = serde_yaml::from_str("name: farmer-keys").unwrap();
        assert_eq!(key_ref.key, "mnemonic");
    }
}
