//! Core types used by the container management subsystem.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::configuration::types::ProvisionConfig;

/// Rootfs size at creation time; the container is grown to the configured
/// size by a separate resize step, matching the two-step provisioning flow.
pub const BASE_ROOTFS_GB: u32 = 2;

/// Everything `pct create` needs for one container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    pub hostname: String,
    pub cores: u16,
    /// Memory limit in MiB.
    pub memory_mb: u32,
    /// Target rootfs size in GiB after the resize step.
    pub disk_gb: u32,
    /// Storage pool holding the rootfs.
    pub storage: String,
    pub bridge: String,
    /// Container address in CIDR notation.
    pub ip: String,
    pub gateway: String,
    /// Local path of the downloaded template image.
    pub template_path: PathBuf,
}

impl ContainerSpec {
    pub fn from_config(config: &ProvisionConfig, template_path: &Path) -> Self {
        ContainerSpec {
            hostname: config.hostname.clone(),
            cores: config.cores,
            memory_mb: config.memory_mb,
            disk_gb: config.disk_gb,
            storage: config.storage.clone(),
            bridge: config.bridge.clone(),
            ip: config.ip.clone(),
            gateway: config.gateway.clone(),
            template_path: template_path.to_path_buf(),
        }
    }
}

/// Handle describing a created container. The VMID allocated at creation
/// is reused by every later hypervisor call.
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    pub vmid: u32,
    pub hostname: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
