//! Kubernetes controllers for Chia component CRDs
//!
//! One controller per kind. Each watches its CRD, wraps reconciliation in a
//! finalizer, and reports through the shared metrics registry.

mod ca_controller;
mod crawler_controller;
mod data_layer_controller;
mod farmer_controller;
mod harvester_controller;
mod introducer_controller;
mod node_controller;
mod seeder_controller;
mod timelord_controller;
mod wallet_controller;

pub use ca_controller::run as run_ca_controller;
pub use crawler_controller::run as run_crawler_controller;
pub use data_layer_controller::run as run_data_layer_controller;
pub use farmer_controller::run as run_farmer_controller;
pub use harvester_controller::run as run_harvester_controller;
pub use introducer_controller::run as run_introducer_controller;
pub use node_controller::run as run_node_controller;
pub use seeder_controller::run as run_seeder_controller;
pub use timelord_controller::run as run_timelord_controller;
pub use wallet_controller::run as run_wallet_controller;

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use kube::Client;

use crate::metrics;

/// Shared context for all controllers
pub struct Context {
    /// Kubernetes client
    pub client: Client,

    /// Custom resources currently under management, per kind. Backs the
    /// managed-resources gauge.
    tracked: Mutex<HashMap<&'static str, HashSet<String>>>,
}

impl Context {
    /// Create a new context
    pub fn new(client: Client) -> Self {
        Self {
            client,
            tracked: Mutex::new(HashMap::new()),
        }
    }

    /// Record a resource as managed and update the gauge
    pub fn track(&self, kind: &'static str, key: &str) {
        let mut tracked = self.tracked.lock().unwrap_or_else(|e| e.into_inner());
        let set = tracked.entry(kind).or_default();
        set.insert(key.to_string());
        metrics::MANAGED_RESOURCES
            .with_label_values(&[kind])
            .set(set.len() as f64);
    }

    /// Forget a resource on cleanup and update the gauge
    pub fn untrack(&self, kind: &'static str, key: &str) {
        let mut tracked = self.tracked.lock().unwrap_or_else(|e| e.into_inner());
        let set = tracked.entry(kind).or_default();
        set.remove(key);
        metrics::MANAGED_RESOURCES
            .with_label_values(&[kind])
            .set(set.len() as f64);
    }
}
