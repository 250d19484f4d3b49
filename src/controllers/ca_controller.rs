//! ChiaCA controller
//!
//! Watches ChiaCA resources and drives CA secret generation.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::{
    api::ListParams,
    runtime::{
        controller::{Action, Controller},
        finalizer::{finalizer, Event as FinalizerEvent},
        watcher::Config as WatcherConfig,
    },
    Api, Client, ResourceExt,
};
use tracing::{error, info, instrument, warn};

use crate::controllers::Context;
use crate::crd::ChiaCA;
use crate::error::{Error, Result};
use crate::metrics;
use crate::reconcilers::{self, ca as ca_reconciler};

const KIND: &str = "ChiaCA";

/// Finalizer name for ChiaCA resources
const FINALIZER_NAME: &str = "k8s.chia.net/ca-finalizer";

/// Run the ChiaCA controller
pub async fn run(client: Client, context: Arc<Context>) {
    let api: Api<ChiaCA> = Api::all(client.clone());

    // Verify CRD is installed
    if let Err(e) = api.list(&ListParams::default().limit(1)).await {
        error!("ChiaCA CRD not installed: {}", e);
        return;
    }

    info!("Starting ChiaCA controller");

    Controller::new(api, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => {
                    info!(
                        name = %obj.name,
                        namespace = obj.namespace.as_deref().unwrap_or("default"),
                        "Reconciled ChiaCA"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation error");
                    metrics::RECONCILIATION_ERRORS.with_label_values(&[KIND]).inc();
                }
            }
        })
        .await;
}

/// Main reconciliation function
#[instrument(skip(ctx), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile(obj: Arc<ChiaCA>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = metrics::RECONCILE_DURATION
        .with_label_values(&[KIND])
        .start_timer();
    metrics::RECONCILIATIONS.with_label_values(&[KIND]).inc();

    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<ChiaCA> = Api::namespaced(ctx.client.clone(), &namespace);

    finalizer(&api, FINALIZER_NAME, obj, |event| async {
        match event {
            FinalizerEvent::Apply(ca) => apply(ca, ctx.clone()).await,
            FinalizerEvent::Cleanup(ca) => cleanup(ca, ctx.clone()).await,
        }
    })
    .await
    .map_err(|e| Error::Finalizer(Box::new(e)))
}

/// Apply reconciliation (create/update)
async fn apply(ca: Arc<ChiaCA>, ctx: Arc<Context>) -> Result<Action> {
    let name = ca.name_any();
    let namespace = ca.namespace().unwrap_or_else(|| "default".to_string());

    info!(
        name = %name,
        namespace = %namespace,
        secret = %ca.spec.secret_name,
        "Reconciling ChiaCA"
    );

    ctx.track(KIND, &format!("{namespace}/{name}"));

    if let Err(e) = ca_reconciler::validate(&ca) {
        warn!(error = %e, "Validation failed");
        reconcilers::patch_status_failed(
            &ctx.client,
            ca.as_ref(),
            "ValidationFailed",
            &e.to_string(),
        )
        .await?;
        return Ok(Action::requeue(Duration::from_secs(300)));
    }

    ca_reconciler::apply(&ca, &ctx.client, &namespace).await
}

/// Cleanup when resource is being deleted
async fn cleanup(ca: Arc<ChiaCA>, ctx: Arc<Context>) -> Result<Action> {
    let name = ca.name_any();
    let namespace = ca.namespace().unwrap_or_else(|| "default".to_string());
    info!(name = %name, "Cleaning up ChiaCA");

    // The generator Job and its RBAC objects are garbage-collected via owner
    // references. The generated Secret is deliberately left in place so
    // dependent components keep working.
    ctx.untrack(KIND, &format!("{namespace}/{name}"));
    metrics::CLEANUPS.with_label_values(&[KIND]).inc();

    Ok(Action::await_change())
}

/// Error policy for the controller
fn error_policy(obj: Arc<ChiaCA>, error: &Error, _ctx: Arc<Context>) -> Action {
    error!(
        name = %obj.name_any(),
        error = %error,
        "Reconciliation failed, scheduling retry"
    );

    let requeue_duration = match error {
        Error::Kube(_) => Duration::from_secs(30),
        Error::Config(_) | Error::Validation(_) => Duration::from_secs(300),
        _ => Duration::from_secs(30),
    };

    Action::requeue(requeue_duration)
}
