//! Custom Resource Definitions for the Chia Operator

pub mod common;

mod chia_ca;
mod chia_crawler;
mod chia_data_layer;
mod chia_farmer;
mod chia_harvester;
mod chia_introducer;
mod chia_node;
mod chia_seeder;
mod chia_timelord;
mod chia_wallet;

pub use chia_ca::*;
pub use chia_crawler::*;
pub use chia_data_layer::*;
pub use chia_farmer::*;
pub use chia_harvester::*;
pub use chia_introducer::*;
pub use chia_node::*;
pub use chia_seeder::*;
pub use chia_timelord::*;
pub use chia_wallet::*;
pub use common::{
    ChiaComponentStatus, CommonSpec, HostPathSpec, PlotVolumeSpec, PvcSpec, ResourcesSpec,
    SecretKeyRef, SecurityContextSpec, StatusCondition, StorageSpec, VolumeSourceSpec,
};

use kube::CustomResourceExt;

/// Generate all CRD YAML manifests
pub fn generate_crds() -> Vec<String> {
    vec![
        serde_yaml::to_string(&ChiaCA::crd()).unwrap(),
        serde_yaml::to_string(&ChiaNode::crd()).unwrap(),
        serde_yaml::to_string(&ChiaFarmer::crd()).unwrap(),
        serde_yaml::to_string(&ChiaHarvester::crd()).unwrap(),
        serde_yaml::to_string(&ChiaWallet::crd()).unwrap(),
        serde_yaml::to_string(&ChiaTimelord::crd()).unwrap(),
        serde_yaml::to_string(&ChiaSeeder::crd()).unwrap(),
        serde_yaml::to_string(&ChiaIntroducer::crd()).unwrap(),
        serde_yaml::to_string(&ChiaCrawler::crd()).unwrap(),
        serde_yaml::to_string(&ChiaDataLayer::crd()).unwrap(),
    ]
}
