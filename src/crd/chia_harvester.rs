//! ChiaHarvester Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChiaComponentStatus, CommonSpec, PlotVolumeSpec};

/// ChiaHarvester resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "k8s.chia.net",
    version = "v1alpha1",
    kind = "ChiaHarvester",
    plural = "chiaharvesters",
    singular = "chiaharvester",
    shortname = "chharvester",
    namespaced,
    status = "ChiaComponentStatus",
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Farmer", "type": "string", "jsonPath": ".spec.farmerAddress"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChiaHarvesterSpec {
    /// Shared Chia component configuration
    #[serde(flatten)]
    pub common: CommonSpec,

    /// Address of the farmer this harvester reports to (host, farmer port assumed)
    pub farmer_address: String,

    /// Plot volumes mounted under /plots
    #[serde(default)]
    pub plot_volumes: Vec<PlotVolumeSpec>,
}
