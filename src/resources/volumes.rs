//! Volume resolution for Chia pods
//!
//! The CHIA_ROOT volume follows a fixed precedence: a PersistentVolumeClaim
//! wins over a hostPath, and an emptyDir is the fallback when neither is
//! configured. Plot volumes for harvesters follow the same precedence per
//! entry.

use k8s_openapi::api::core::v1::{
    EmptyDirVolumeSource, HostPathVolumeSource, PersistentVolumeClaimVolumeSource,
    SecretVolumeSource, Volume, VolumeMount,
};

use crate::crd::{PlotVolumeSpec, PvcSpec, StorageSpec, VolumeSourceSpec};
use crate::error::{Error, Result};

/// Mount path for CHIA_ROOT inside every chia container
pub const CHIA_ROOT_PATH: &str = "/chia-data";

/// Mount path for the CA secret
pub const CA_MOUNT_PATH: &str = "/chia-ca";

/// Mount path for the mnemonic secret
pub const KEY_MOUNT_PATH: &str = "/key";

/// Root directory for harvester plot mounts
pub const PLOTS_MOUNT_ROOT: &str = "/plots";

/// Volume name used for CHIA_ROOT
pub const CHIA_ROOT_VOLUME: &str = "chiaroot";

/// Name of the claim a generated CHIA_ROOT PVC gets
pub fn generated_claim_name(resource_name: &str) -> String {
    format!("{resource_name}-chia-root")
}

/// Effective claim name for a PVC spec, falling back to the generated name
pub fn claim_name(resource_name: &str, pvc: &PvcSpec) -> String {
    pvc.claim_name
        .clone()
        .unwrap_or_else(|| generated_claim_name(resource_name))
}

/// The PVC spec to generate a claim for, if any
pub fn pvc_to_generate(storage: Option<&StorageSpec>) -> Option<&PvcSpec> {
    storage
        .and_then(|s| s.chia_root.as_ref())
        .and_then(|root| root.persistent_volume_claim.as_ref())
        .filter(|pvc| pvc.generate && pvc.claim_name.is_none())
}

/// Resolve the CHIA_ROOT volume for a resource. PVC wins over hostPath;
/// an emptyDir is used when storage is not configured at all.
pub fn chia_root_volume(resource_name: &str, storage: Option<&StorageSpec>) -> Volume {
    let source = storage.and_then(|s| s.chia_root.as_ref());
    resolve_volume(CHIA_ROOT_VOLUME, resource_name, source)
}

fn resolve_volume(
    volume_name: &str,
    resource_name: &str,
    source: Option<&VolumeSourceSpec>,
) -> Volume {
    if let Some(source) = source {
        if let Some(pvc) = &source.persistent_volume_claim {
            return Volume {
                name: volume_name.to_string(),
                persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                    claim_name: claim_name(resource_name, pvc),
                    ..Default::default()
                }),
                ..Default::default()
            };
        }
        if let Some(host_path) = &source.host_path {
            return Volume {
                name: volume_name.to_string(),
                host_path: Some(HostPathVolumeSource {
                    path: host_path.path.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            };
        }
    }

    Volume {
        name: volume_name.to_string(),
        empty_dir: Some(EmptyDirVolumeSource::default()),
        ..Default::default()
    }
}

/// Mount for the CHIA_ROOT volume
pub fn chia_root_mount() -> VolumeMount {
    VolumeMount {
        name: CHIA_ROOT_VOLUME.to_string(),
        mount_path: CHIA_ROOT_PATH.to_string(),
        ..Default::default()
    }
}

/// Volume projecting a Kubernetes Secret
pub fn secret_volume(volume_name: &str, secret_name: &str) -> Volume {
    Volume {
        name: volume_name.to_string(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(secret_name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// CA secret volume and mount
pub fn ca_volume(secret_name: &str) -> Volume {
    secret_volume("ca", secret_name)
}

/// Mount for the CA secret volume
pub fn ca_mount() -> VolumeMount {
    VolumeMount {
        name: "ca".to_string(),
        mount_path: CA_MOUNT_PATH.to_string(),
        read_only: Some(true),
        ..Default::default()
    }
}

/// Mnemonic secret volume
pub fn key_volume(secret_name: &str) -> Volume {
    secret_volume("key", secret_name)
}

/// Mount for the mnemonic secret volume
pub fn key_mount() -> VolumeMount {
    VolumeMount {
        name: "key".to_string(),
        mount_path: KEY_MOUNT_PATH.to_string(),
        read_only: Some(true),
        ..Default::default()
    }
}

/// Mount path of a named plot volume
pub fn plot_mount_path(name: &str) -> String {
    format!("{PLOTS_MOUNT_ROOT}/{name}")
}

/// Expand harvester plot volume specs into volumes and mounts.
///
/// Each entry must name a PVC or a hostPath; an empty entry is a validation
/// error surfaced here because the builder is the first place the volume
/// source is actually resolved.
pub fn plot_volumes(specs: &[PlotVolumeSpec]) -> Result<(Vec<Volume>, Vec<VolumeMount>)> {
    let mut volumes = Vec::with_capacity(specs.len());
    let mut mounts = Vec::with_capacity(specs.len());

    for spec in specs {
        if spec.source.is_empty() {
            return Err(Error::validation(format!(
                "Plot volume '{}' must specify a persistentVolumeClaim or hostPath",
                spec.name
            )));
        }
        volumes.push(resolve_volume(&spec.name, &spec.name, Some(&spec.source)));
        mounts.push(VolumeMount {
            name: spec.name.clone(),
            mount_path: plot_mount_path(&spec.name),
            read_only: Some(true),
            ..Default::default()
        });
    }

    Ok((volumes, mounts))
}

/// Colon-separated plot directory list for the `plots_dir` environment variable
pub fn plots_dir(specs: &[PlotVolumeSpec]) -> String {
    specs
        .iter()
        .map(|s| plot_mount_path(&s.name))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::HostPathSpec;

    fn pvc_source(claim: &str) -> VolumeSourceSpec {
        VolumeSourceSpec {
            persistent_volume_claim: Some(PvcSpec {
                claim_name: Some(claim.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn host_path_source(path: &str) -> VolumeSourceSpec {
        VolumeSourceSpec {
            host_path: Some(HostPathSpec {
                path: path.to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn pvc_wins_over_host_path() {
        let mut source = pvc_source("my-claim");
        source.host_path = Some(HostPathSpec {
            path: "/mnt/chia".to_string(),
        });

        let storage = StorageSpec {
            chia_root: Some(source),
        };
        let volume = chia_root_volume("node1", Some(&storage));

        assert_eq!(
            volume.persistent_volume_claim.unwrap().claim_name,
            "my-claim"
        );
        assert!(volume.host_path.is_none());
    }

    #[test]
    fn host_path_used_when_no_pvc() {
        let storage = StorageSpec {
            chia_root: Some(host_path_source("/mnt/chia")),
        };
        let volume = chia_root_volume("node1", Some(&storage));

        assert_eq!(volume.host_path.unwrap().path, "/mnt/chia");
        assert!(volume.persistent_volume_claim.is_none());
    }

    #[test]
    fn empty_dir_fallback_when_no_storage() {
        let volume = chia_root_volume("node1", None);
        assert!(volume.empty_dir.is_some());
    }

    #[test]
    fn generated_claim_name_used_when_claim_unset() {
        let storage = StorageSpec {
            chia_root: Some(VolumeSourceSpec {
                persistent_volume_claim: Some(PvcSpec {
                    generate: true,
                    size: Some("300Gi".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };

        let volume = chia_root_volume("node1", Some(&storage));
        assert_eq!(
            volume.persistent_volume_claim.unwrap().claim_name,
            "node1-chia-root"
        );
        assert!(pvc_to_generate(Some(&storage)).is_some());
    }

    #[test]
    fn plot_volumes_reject_empty_source() {
        let specs = vec![PlotVolumeSpec {
            name: "plots1".to_string(),
            source: VolumeSourceSpec::default(),
        }];
        assert!(plot_volumes(&specs).is_err());
    }

    #[test]
    fn plots_dir_joins_mount_paths() {
        let specs = vec![
            PlotVolumeSpec {
                name: "a".to_string(),
                source: pvc_source("claim-a"),
            },
            PlotVolumeSpec {
                name: "b".to_string(),
                source: host_path_source("/mnt/plots"),
            },
        ];
        assert_eq!(plots_dir(&specs), "/plots/a:/plots/b");
    }
}
