//! Chia Kubernetes Operator
//!
//! Main entry point for the operator. Sets up the Kubernetes client,
//! registers CRD controllers, and runs the reconciliation loops.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future;
use kube::Client;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chia_operator::{
    controllers::{self, Context},
    metrics,
};

/// Default metrics port, overridable via METRICS_PORT
const METRICS_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    info!("Starting Chia Operator");

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes API server");

    // Create shared context
    let context = Arc::new(Context::new(client.clone()));

    // Start metrics server
    let metrics_port = std::env::var("METRICS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(METRICS_PORT);
    let metrics_handle = tokio::spawn(metrics::serve(metrics_port));
    info!("Metrics server starting on port {}", metrics_port);

    // Run one controller per kind concurrently
    let controller_futures: Vec<Pin<Box<dyn Future<Output = ()> + Send>>> = vec![
        Box::pin(controllers::run_ca_controller(client.clone(), context.clone())),
        Box::pin(controllers::run_node_controller(client.clone(), context.clone())),
        Box::pin(controllers::run_farmer_controller(client.clone(), context.clone())),
        Box::pin(controllers::run_harvester_controller(
            client.clone(),
            context.clone(),
        )),
        Box::pin(controllers::run_wallet_controller(client.clone(), context.clone())),
        Box::pin(controllers::run_timelord_controller(
            client.clone(),
            context.clone(),
        )),
        Box::pin(controllers::run_seeder_controller(client.clone(), context.clone())),
        Box::pin(controllers::run_introducer_controller(
            client.clone(),
            context.clone(),
        )),
        Box::pin(controllers::run_crawler_controller(
            client.clone(),
            context.clone(),
        )),
        Box::pin(controllers::run_data_layer_controller(client, context)),
    ];
    let all_controllers = future::join_all(controller_futures);

    // Handle graceful shutdown
    tokio::select! {
        _ = all_controllers => {
            error!("Controllers exited unexpectedly");
        }
        _ = metrics_handle => {
            error!("Metrics server exited unexpectedly");
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, stopping operator");
        }
    }

    info!("Chia Operator stopped");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kube=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
