//! RBAC and Job builders for CA bootstrap
//!
//! The CA generator Job runs in the target namespace with a purpose-built
//! ServiceAccount whose Role only allows touching Secrets, since the
//! generator writes its output directly into the cluster.

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec, ServiceAccount};
use k8s_openapi::api::rbac::v1::{PolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use super::{owner_reference, standard_labels};
use crate::crd::ChiaCA;

/// Retries the generator Job gets before it is considered failed
pub const CA_JOB_BACKOFF_LIMIT: i32 = 3;

/// Component label for CA bootstrap objects
const COMPONENT: &str = "ca";

/// Name shared by the generator Job and its RBAC objects
pub fn generator_name(ca: &ChiaCA) -> String {
    format!("{}-ca-gen", ca.name_any())
}

fn object_meta(ca: &ChiaCA, name: String) -> ObjectMeta {
    ObjectMeta {
        name: Some(name),
        namespace: ca.namespace(),
        labels: Some(standard_labels(ca, COMPONENT, None)),
        owner_references: Some(vec![owner_reference(ca)]),
        ..Default::default()
    }
}

/// ServiceAccount the generator Job runs as
pub fn build_service_account(ca: &ChiaCA) -> ServiceAccount {
    ServiceAccount {
        metadata: object_meta(ca, generator_name(ca)),
        ..Default::default()
    }
}

/// Role allowing the generator to write its Secret
pub fn build_role(ca: &ChiaCA) -> Role {
    Role {
        metadata: object_meta(ca, generator_name(ca)),
        rules: Some(vec![PolicyRule {
            api_groups: Some(vec!["".to_string()]),
            resources: Some(vec!["secrets".to_string()]),
            verbs: vec![
                "get".to_string(),
                "create".to_string(),
                "update".to_string(),
            ],
            ..Default::default()
        }]),
    }
}

/// RoleBinding tying the ServiceAccount to the Role
pub fn build_role_binding(ca: &ChiaCA) -> RoleBinding {
    let name = generator_name(ca);
    let namespace = ca.namespace().unwrap_or_else(|| "default".to_string());

    RoleBinding {
        metadata: object_meta(ca, name.clone()),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "Role".to_string(),
            name: name.clone(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name,
            namespace: Some(namespace),
            ..Default::default()
        }]),
    }
}

/// One-shot Job that generates the CA material and writes the Secret
pub fn build_ca_job(ca: &ChiaCA) -> Job {
    let namespace = ca.namespace().unwrap_or_else(|| "default".to_string());

    let container = Container {
        name: "ca-gen".to_string(),
        image: Some(ca.spec.generator_image().to_string()),
        image_pull_policy: ca.spec.image_pull_policy.clone(),
        env: Some(vec![
            EnvVar {
                name: "SECRET_NAME".to_string(),
                value: Some(ca.spec.secret_name.clone()),
                ..Default::default()
            },
            EnvVar {
                name: "NAMESPACE".to_string(),
                value: Some(namespace),
                ..Default::default()
            },
        ]),
        ..Default::default()
    };

    Job {
        metadata: object_meta(ca, generator_name(ca)),
        spec: Some(JobSpec {
            backoff_limit: Some(CA_JOB_BACKOFF_LIMIT),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(standard_labels(ca, COMPONENT, None)),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    service_account_name: Some(generator_name(ca)),
                    restart_policy: Some("Never".to_string()),
                    containers: vec![container],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}
