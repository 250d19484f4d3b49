//! ChiaCA reconciler
//!
//! Drives a small state machine: Secret absent -> RBAC + generator Job
//! applied -> polling -> Secret present -> Ready. Polling is done by
//! requeueing the resource at a fixed interval rather than sleeping on the
//! worker, and the overall generation budget is measured from the Job's
//! creation timestamp. Exhausting the budget or an outright Job failure sets
//! a Failed condition; the resource is never left in a silent limbo.

use std::time::Duration;

use chrono::{DateTime, Utc};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Secret;
use kube::runtime::controller::Action;
use kube::{Api, Client, ResourceExt};
use tracing::{info, warn};

use super::{patch_status_failed, patch_status_ready};
use crate::crd::ChiaCA;
use crate::error::{Error, Result};
use crate::metrics;
use crate::resources::{self, rbac};

/// Interval between Secret existence checks while the generator runs
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Total time the generator Job gets to produce the Secret
pub const GENERATION_BUDGET: Duration = Duration::from_secs(1000);

/// Requeue interval once the CA secret exists
const STEADY_STATE_REQUEUE: Duration = Duration::from_secs(600);

/// Requeue interval after a generation failure
const FAILURE_REQUEUE: Duration = Duration::from_secs(300);

/// Validate the ChiaCA spec
pub fn validate(ca: &ChiaCA) -> Result<()> {
    if ca.spec.secret_name.trim().is_empty() {
        return Err(Error::validation("secretName must not be empty"));
    }
    Ok(())
}

/// Reconcile a ChiaCA
pub async fn apply(ca: &ChiaCA, client: &Client, namespace: &str) -> Result<Action> {
    let name = ca.name_any();
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);

    if secrets.get_opt(&ca.spec.secret_name).await?.is_some() {
        let newly_ready = !ca.status.as_ref().map(|s| s.ready).unwrap_or(false);
        if newly_ready {
            info!(name = %name, secret = %ca.spec.secret_name, "CA secret present");
            metrics::CA_GENERATIONS_TOTAL
                .with_label_values(&["success", namespace])
                .inc();
        }
        patch_status_ready(client, ca, "CASecretPresent", "CA secret exists").await?;
        return Ok(Action::requeue(STEADY_STATE_REQUEUE));
    }

    resources::apply(client, namespace, &rbac::build_service_account(ca)).await?;
    resources::apply(client, namespace, &rbac::build_role(ca)).await?;
    resources::apply(client, namespace, &rbac::build_role_binding(ca)).await?;

    let created = resources::create_if_absent(client, namespace, &rbac::build_ca_job(ca)).await?;
    if created {
        info!(name = %name, "Launched CA generator Job");
    }

    let jobs: Api<Job> = Api::namespaced(client.clone(), namespace);
    let job = jobs.get(&rbac::generator_name(ca)).await?;

    if job_failed(&job) {
        warn!(name = %name, "CA generator Job failed");
        metrics::CA_GENERATIONS_TOTAL
            .with_label_values(&["failure", namespace])
            .inc();
        patch_status_failed(
            client,
            ca,
            "CAGenerationFailed",
            "CA generator Job failed; delete the Job to retry",
        )
        .await?;
        return Ok(Action::requeue(FAILURE_REQUEUE));
    }

    let job_created = job.metadata.creation_timestamp.as_ref().map(|t| t.0);
    if budget_exceeded(job_created, Utc::now()) {
        warn!(name = %name, "CA generation budget exceeded");
        metrics::CA_GENERATIONS_TOTAL
            .with_label_values(&["timeout", namespace])
            .inc();
        patch_status_failed(
            client,
            ca,
            "CAGenerationTimeout",
            "CA secret did not appear within the generation budget",
        )
        .await?;
        return Ok(Action::requeue(FAILURE_REQUEUE));
    }

    // Secret not there yet, generator still within budget
    Ok(Action::requeue(POLL_INTERVAL))
}

/// True once the Job has reported a terminal Failed condition
fn job_failed(job: &Job) -> bool {
    job.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Failed" && c.status == "True")
        })
        .unwrap_or(false)
}

/// True once the generation budget has elapsed since Job creation.
///
/// A missing creation timestamp means the Job was only just created, which
/// counts as within budget.
fn budget_exceeded(job_created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match job_created {
        Some(created) => {
            let elapsed = (now - created).to_std().unwrap_or(Duration::ZERO);
            elapsed > GENERATION_BUDGET
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn budget_not_exceeded_within_window() {
        let now = Utc::now();
        let created = now - ChronoDuration::seconds(999);
        assert!(!budget_exceeded(Some(created), now));
    }

    #[test]
    fn budget_exceeded_after_window() {
        let now = Utc::now();
        let created = now - ChronoDuration::seconds(1001);
        assert!(budget_exceeded(Some(created), now));
    }

    #[test]
    fn missing_creation_timestamp_is_within_budget() {
        assert!(!budget_exceeded(None, Utc::now()));
    }

    #[test]
    fn job_failure_requires_terminal_condition() {
        use k8s_openapi::api::batch::v1::{JobCondition, JobStatus};

        let mut job = Job::default();
        assert!(!job_failed(&job));

        job.status = Some(JobStatus {
            conditions: Some(vec![JobCondition {
                type_: "Failed".to_string(),
                status: "True".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        });
        assert!(job_failed(&job));
    }
}
