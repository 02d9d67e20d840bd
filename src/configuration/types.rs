//! Core types used by the configuration subsystem.

use serde::Deserialize;

/// Default container network address (CIDR notation).
pub const DEFAULT_IP: &str = "192.168.1.101/24";
/// Default gateway address.
pub const DEFAULT_GATEWAY: &str = "192.168.1.1";

pub const DEFAULT_HOSTNAME: &str = "github-runner";
pub const DEFAULT_CORES: u16 = 2;
pub const DEFAULT_MEMORY_MB: u32 = 2048;
pub const DEFAULT_DISK_GB: u32 = 8;
pub const DEFAULT_STORAGE: &str = "local-lvm";
pub const DEFAULT_BRIDGE: &str = "vmbr0";

/// Default LXC template image downloaded when `--template-url` is not given.
pub const DEFAULT_TEMPLATE_URL: &str =
    "http://download.proxmox.com/images/system/ubuntu-22.04-standard_22.04-1_amd64.tar.zst";

/// Fully resolved runtime parameters for one provisioning run.
///
/// Every field is final: flag/env/file/prompt resolution has already
/// happened by the time a value lands here.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionConfig {
    /// GitHub token used to request the registration token.
    pub gh_token: String,
    /// Target repository in `owner/repo` form.
    pub owner_repo: String,
    /// Container address in CIDR notation (e.g. `192.168.1.101/24`).
    pub ip: String,
    /// Gateway address for the container network.
    pub gateway: String,
    pub hostname: String,
    pub cores: u16,
    /// Memory limit in MiB.
    pub memory_mb: u32,
    /// Rootfs size in GiB the container is resized to after creation.
    pub disk_gb: u32,
    /// Proxmox storage pool holding the container rootfs.
    pub storage: String,
    /// Network bridge the container NIC attaches to.
    pub bridge: String,
    pub template_url: String,
    /// Runner name registered with GitHub.
    pub runner_name: String,
    /// Extra comma-separated runner labels, if any.
    pub labels: Option<String>,
}

/// Optional defaults loaded from a `runnerbox.toml` file.
///
/// Flags and environment variables always win over file values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileDefaults {
    pub ip: Option<String>,
    pub gateway: Option<String>,
    pub hostname: Option<String>,
    pub cores: Option<u16>,
    pub memory_mb: Option<u32>,
    pub disk_gb: Option<u32>,
    pub storage: Option<String>,
    pub bridge: Option<String>,
    pub template_url: Option<String>,
}
