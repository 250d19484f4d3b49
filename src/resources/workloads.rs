//! Workload and Service builders shared by all component reconcilers

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{
    Container, PersistentVolumeClaim, PersistentVolumeClaimSpec, PodSecurityContext, PodSpec,
    PodTemplateSpec, Service, ServicePort, ServiceSpec, Volume, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::{Resource, ResourceExt};

use super::{extra_annotations, owner_reference, standard_labels};
use crate::crd::{CommonSpec, PvcSpec, SecurityContextSpec};

/// Default size for generated CHIA_ROOT claims
const DEFAULT_PVC_SIZE: &str = "100Gi";

/// Named TCP ServicePort
pub fn service_port(name: &str, port: i32) -> ServicePort {
    ServicePort {
        name: Some(name.to_string()),
        port,
        target_port: Some(IntOrString::Int(port)),
        ..Default::default()
    }
}

/// Named UDP ServicePort
pub fn service_port_udp(name: &str, port: i32) -> ServicePort {
    ServicePort {
        name: Some(name.to_string()),
        port,
        target_port: Some(IntOrString::Int(port)),
        protocol: Some("UDP".to_string()),
        ..Default::default()
    }
}

fn object_meta<K>(obj: &K, component: &str, common: &CommonSpec, name: String) -> ObjectMeta
where
    K: Resource<DynamicType = ()>,
{
    ObjectMeta {
        name: Some(name),
        namespace: obj.namespace(),
        labels: Some(standard_labels(obj, component, Some(common))),
        annotations: extra_annotations(Some(common)),
        owner_references: Some(vec![owner_reference(obj)]),
        ..Default::default()
    }
}

/// Build a Service for a component
pub fn build_service<K>(
    obj: &K,
    component: &str,
    common: &CommonSpec,
    name: String,
    ports: Vec<ServicePort>,
) -> Service
where
    K: Resource<DynamicType = ()>,
{
    let labels = standard_labels(obj, component, Some(common));

    Service {
        metadata: object_meta(obj, component, common, name),
        spec: Some(ServiceSpec {
            type_: common.service_type.clone(),
            selector: Some(labels),
            ports: Some(ports),
            ..Default::default()
        }),
        status: None,
    }
}

fn pod_security_context(spec: Option<&SecurityContextSpec>) -> Option<PodSecurityContext> {
    spec.map(|s| PodSecurityContext {
        run_as_user: s.run_as_user,
        run_as_group: s.run_as_group,
        fs_group: s.fs_group,
        run_as_non_root: s.run_as_non_root,
        ..Default::default()
    })
}

fn pod_template(
    labels: BTreeMap<String, String>,
    common: &CommonSpec,
    container: Container,
    volumes: Vec<Volume>,
) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(labels),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            containers: vec![container],
            volumes: if volumes.is_empty() {
                None
            } else {
                Some(volumes)
            },
            node_selector: common.node_selector.clone(),
            security_context: pod_security_context(common.security_context.as_ref()),
            ..Default::default()
        }),
    }
}

/// Build a single-replica Deployment for a component
pub fn build_deployment<K>(
    obj: &K,
    component: &str,
    common: &CommonSpec,
    container: Container,
    volumes: Vec<Volume>,
) -> Deployment
where
    K: Resource<DynamicType = ()>,
{
    let labels = standard_labels(obj, component, Some(common));

    Deployment {
        metadata: object_meta(obj, component, common, obj.name_any()),
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: pod_template(labels, common, container, volumes),
            ..Default::default()
        }),
        status: None,
    }
}

/// Build a StatefulSet for the full node
pub fn build_statefulset<K>(
    obj: &K,
    component: &str,
    common: &CommonSpec,
    container: Container,
    volumes: Vec<Volume>,
    replicas: i32,
    headless_service: String,
) -> StatefulSet
where
    K: Resource<DynamicType = ()>,
{
    let labels = standard_labels(obj, component, Some(common));

    StatefulSet {
        metadata: object_meta(obj, component, common, obj.name_any()),
        spec: Some(StatefulSetSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            service_name: headless_service,
            template: pod_template(labels, common, container, volumes),
            ..Default::default()
        }),
        status: None,
    }
}

/// Build a PersistentVolumeClaim the operator generates for CHIA_ROOT
pub fn build_pvc<K>(
    obj: &K,
    component: &str,
    common: &CommonSpec,
    name: String,
    pvc: &PvcSpec,
) -> PersistentVolumeClaim
where
    K: Resource<DynamicType = ()>,
{
    let mut requests = BTreeMap::new();
    requests.insert(
        "storage".to_string(),
        Quantity(
            pvc.size
                .clone()
                .unwrap_or_else(|| DEFAULT_PVC_SIZE.to_string()),
        ),
    );

    PersistentVolumeClaim {
        metadata: object_meta(obj, component, common, name),
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            storage_class_name: pvc.storage_class.clone(),
            resources: Some(VolumeResourceRequirements {
                requests: Some(requests),
                ..Default::default()
            }),
            ..Default::default()
        }),
        status: None,
    }
}
