//! ChiaCrawler controller
//!
//! Watches ChiaCrawler resources and triggers reconciliation.

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
use crate::crd::ChiaCrawler;
use crate::error::{Error, Result};
use crate::metrics;
use crate::reconcilers::{self, crawler as crawler_reconciler};

const KIND: &str = "ChiaCrawler";

/// Finalizer name for ChiaCrawler resources
const FINALIZER_NAME: &str = "k8s.chia.net/crawler-finalizer";

/// Run the ChiaCrawler controller
pub async fn run(client: Client, context: Arc<Context>) {
    let api: Api<ChiaCrawler> = Api::all(client.clone());

    // Verify CRD is installed
    if let Err(e) = api.list(&ListParams::default().limit(1)).await {
        error!("ChiaCrawler CRD not installed: {}", e);
        return;
    }

    info!("Starting ChiaCrawler controller");

    Controller::new(api, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => {
                    info!(
                        name = %obj.name,
                        namespace = obj.namespace.as_deref().unwrap_or("default"),
                        "Reconciled ChiaCrawler"
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
async fn reconcile(obj: Arc<ChiaCrawler>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = metrics::RECONCILE_DURATION
        .with_label_values(&[KIND])
        .start_timer();
    metrics::RECONCILIATIONS.with_label_values(&[KIND]).inc();

    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<ChiaCrawler> = Api::namespaced(ctx.client.clone(), &namespace);

    finalizer(&api, FINALIZER_NAME, obj, |event| async {
        match event {
            FinalizerEvent::Apply(obj) => apply(obj, ctx.clone()).await,
            FinalizerEvent::Cleanup(obj) => cleanup(obj, ctx.clone()).await,
        }
    })
    .await
    .map_err(|e| Error::Finalizer(Box::new(e)))
}

/// Apply reconciliation (create/update)
async fn apply(obj: Arc<ChiaCrawler>, ctx: Arc<Context>) -> Result<Action> {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());

    info!(
        name = %name,
        namespace = %namespace,
        generation = obj.metadata.generation.unwrap_or(0),
        "Reconciling ChiaCrawler"
    );

    ctx.track(KIND, &format!("{namespace}/{name}"));

    if let Err(e) = crawler_reconciler::validate(&obj) {
        warn!(error = %e, "Validation failed");
        reconcilers::patch_status_failed(
            &ctx.client,
            obj.as_ref(),
            "ValidationFailed",
            &e.to_string(),
        )
        .await?;
        return Ok(Action::requeue(Duration::from_secs(300)));
    }

    crawler_reconciler::apply(&obj, &ctx.client, &namespace).await
}

/// Cleanup when resource is being deleted
async fn cleanup(obj: Arc<ChiaCrawler>, ctx: Arc<Context>) -> Result<Action> {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    info!(name = %name, "Cleaning up ChiaCrawler");

    // Child objects are garbage-collected via owner references.
    ctx.untrack(KIND, &format!("{namespace}/{name}"));
    metrics::CLEANUPS.with_label_values(&[KIND]).inc();

    Ok(Action::await_change())
}

/// Error policy for the controller
fn error_policy(obj: Arc<ChiaCrawler>, error: &Error, _ctx: Arc<Context>) -> Action {
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
