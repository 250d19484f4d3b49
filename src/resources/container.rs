//! Chia container assembly
//!
//! All component pods run the same Chia image and select their role via the
//! `service` environment variable, so the container builder is shared and
//! parameterized by service name, ports, and extra env.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, Probe, ResourceRequirements, TCPSocketAction, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use super::default_image;
use super::volumes::{CA_MOUNT_PATH, CHIA_ROOT_PATH, KEY_MOUNT_PATH};
use crate::crd::{CommonSpec, ResourcesSpec};

/// Value of the `keys` env var for services that hold no keys
pub const KEYS_NONE: &str = "none";

/// Path to the mounted mnemonic file inside key-holding containers
pub fn mnemonic_path(key: &str) -> String {
    format!("{KEY_MOUNT_PATH}/{key}")
}

/// Base environment shared by every chia service container.
///
/// `keys` is the mnemonic file path for key-holding services (farmer,
/// wallet, data layer) and [`KEYS_NONE`] for everything else.
pub fn chia_env(common: &CommonSpec, service: &str, keys: &str) -> Vec<EnvVar> {
    let mut env = vec![
        env_var("service", service),
        env_var("CHIA_ROOT", CHIA_ROOT_PATH),
        env_var("keys", keys),
        env_var("self_hostname", "0.0.0.0"),
    ];

    if common.ca_secret_name.is_some() {
        env.push(env_var("ca", CA_MOUNT_PATH));
    }
    if common.testnet {
        env.push(env_var("testnet", "true"));
    }
    if let Some(network) = &common.network {
        env.push(env_var("network", network));
    }
    if let Some(tz) = &common.timezone {
        env.push(env_var("TZ", tz));
    }
    if let Some(level) = &common.log_level {
        env.push(env_var("log_level", level));
    }

    env
}

/// Simple value EnvVar
pub fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        ..Default::default()
    }
}

/// Named container port
pub fn container_port(name: &str, port: i32) -> ContainerPort {
    ContainerPort {
        name: Some(name.to_string()),
        container_port: port,
        ..Default::default()
    }
}

/// Build the chia container for a component.
///
/// The first port in `ports` doubles as the probe target when probes are
/// enabled.
pub fn build_chia_container(
    common: &CommonSpec,
    service: &str,
    keys: &str,
    ports: Vec<ContainerPort>,
    extra_env: Vec<EnvVar>,
    mounts: Vec<VolumeMount>,
) -> Container {
    let mut env = chia_env(common, service, keys);
    env.extend(extra_env);

    let probe = if common.probes_enabled {
        ports.first().map(|p| tcp_probe(p.container_port))
    } else {
        None
    };

    Container {
        name: "chia".to_string(),
        image: Some(
            common
                .image
                .clone()
                .unwrap_or_else(|| default_image().to_string()),
        ),
        image_pull_policy: common.image_pull_policy.clone(),
        env: Some(env),
        ports: Some(ports),
        volume_mounts: Some(mounts),
        resources: resource_requirements(common.resources.as_ref()),
        liveness_probe: probe.clone(),
        readiness_probe: probe,
        ..Default::default()
    }
}

fn tcp_probe(port: i32) -> Probe {
    Probe {
        tcp_socket: Some(TCPSocketAction {
            port: IntOrString::Int(port),
            ..Default::default()
        }),
        initial_delay_seconds: Some(30),
        period_seconds: Some(10),
        failure_threshold: Some(6),
        ..Default::default()
    }
}

/// Map spec-level resource strings to Kubernetes quantities
pub fn resource_requirements(spec: Option<&ResourcesSpec>) -> Option<ResourceRequirements> {
    let spec = spec?;

    let to_quantities = |map: &BTreeMap<String, String>| -> BTreeMap<String, Quantity> {
        map.iter()
            .map(|(k, v)| (k.clone(), Quantity(v.clone())))
            .collect()
    };

    Some(ResourceRequirements {
        limits: spec.limits.as_ref().map(to_quantities),
        requests: spec.requests.as_ref().map(to_quantities),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::DEFAULT_CHIA_IMAGE;

    #[test]
    fn image_defaults_when_unset() {
        let common = CommonSpec::default();
        let container = build_chia_container(&common, "node", KEYS_NONE, vec![], vec![], vec![]);
        assert_eq!(container.image.as_deref(), Some(DEFAULT_CHIA_IMAGE));
    }

    #[test]
    fn image_override_respected() {
        let common = CommonSpec {
            image: Some("ghcr.io/chia-network/chia:2.4.1".to_string()),
            ..Default::default()
        };
        let container = build_chia_container(&common, "node", KEYS_NONE, vec![], vec![], vec![]);
        assert_eq!(
            container.image.as_deref(),
            Some("ghcr.io/chia-network/chia:2.4.1")
        );
    }

    #[test]
    fn env_includes_service_and_chia_root() {
        let common = CommonSpec {
            testnet: true,
            log_level: Some("DEBUG".to_string()),
            ..Default::default()
        };
        let env = chia_env(&common, "farmer-only", "/key/mnemonic");
        let get = |name: &str| {
            env.iter()
                .find(|e| e.name == name)
                .and_then(|e| e.value.clone())
        };

        assert_eq!(get("service").as_deref(), Some("farmer-only"));
        assert_eq!(get("CHIA_ROOT").as_deref(), Some(CHIA_ROOT_PATH));
        assert_eq!(get("keys").as_deref(), Some("/key/mnemonic"));
        assert_eq!(get("testnet").as_deref(), Some("true"));
        assert_eq!(get("log_level").as_deref(), Some("DEBUG"));
    }

    #[test]
    fn ca_env_present_only_with_ca_secret() {
        let without = chia_env(&CommonSpec::default(), "node", KEYS_NONE);
        assert!(!without.iter().any(|e| e.name == "ca"));

        let with = chia_env(
            &CommonSpec {
                ca_secret_name: Some("chia-ca".to_string()),
                ..Default::default()
            },
            "node",
            KEYS_NONE,
        );
        assert!(with.iter().any(|e| e.name == "ca"));
    }

    #[test]
    fn probes_follow_first_port_and_toggle() {
        let common = CommonSpec::default();
        let container = build_chia_container(
            &common,
            "node",
            KEYS_NONE,
            vec![container_port("peer", 8444)],
            vec![],
            vec![],
        );
        let probe = container.liveness_probe.unwrap();
        assert_eq!(
            probe.tcp_socket.unwrap().port,
            IntOrString::Int(8444)
        );

        let no_probes = CommonSpec {
            probes_enabled: false,
            ..Default::default()
        };
        let container = build_chia_container(
            &no_probes,
            "node",
            KEYS_NONE,
            vec![container_port("peer", 8444)],
            vec![],
            vec![],
        );
        assert!(container.liveness_probe.is_none());
    }
}
