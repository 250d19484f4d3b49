//! Chia Kubernetes Operator
//!
//! This operator manages Chia blockchain network components (full nodes,
//! farmers, harvesters, wallets, timelords, seeders, introducers, crawlers,
//! data layer services, and certificate authority generation) in Kubernetes
//! using Custom Resource Definitions (CRDs).

pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;
pub mod resources;

pub use error::{Error, Result};
