use chrono::Utc;
use log::{debug, error, info};
use tokio::process::Command;

use crate::container_management::types::{ContainerHandle, ContainerSpec, BASE_ROOTFS_GB};
use crate::error_handling::types::ContainerError;

/// Wrapper over the Proxmox container CLI.
///
/// Each method is one blocking invocation of `pct` or `pvesh`; a non-zero
/// exit status surfaces as [`ContainerError::CommandFailed`] carrying the
/// tool's stderr, which aborts the run.
pub struct PctClient;

impl PctClient {
    /// Creates a new `PctClient`.
    ///
    /// Returns an error if the Proxmox tooling is not available on the host.
    pub fn new() -> Result<Self, ContainerError> {
        if !Self::is_runtime_available() {
            error!("pct is not available on this system");
            return Err(ContainerError::RuntimeNotAvailable);
        }
        Ok(PctClient)
    }

    /// Checks whether the container CLI is available on the system.
    fn is_runtime_available() -> bool {
        let available = std::process::Command::new("pct")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);

        debug!("pct availability check: {}", available);
        available
    }

    /// Asks the cluster for the next free VMID.
    pub async fn next_id(&self) -> Result<u32, ContainerError> {
        let stdout = run("pvesh", &["get".to_string(), "/cluster/nextid".to_string()]).await?;
        let vmid = parse_vmid(&stdout)?;
        info!("Allocated VMID {}", vmid);
        Ok(vmid)
    }

    /// Creates the container from the downloaded template.
    pub async fn create(
        &self,
        vmid: u32,
        spec: &ContainerSpec,
    ) -> Result<ContainerHandle, ContainerError> {
        info!("Creating container {} ({})", vmid, spec.hostname);
        run("pct", &create_args(vmid, spec)).await?;

        Ok(ContainerHandle {
            vmid,
            hostname: spec.hostname.clone(),
            created_at: Utc::now(),
        })
    }

    /// Grows the rootfs to the configured size.
    pub async fn resize_rootfs(
        &self,
        handle: &ContainerHandle,
        disk_gb: u32,
    ) -> Result<(), ContainerError> {
        info!("Resizing rootfs of {} to {}G", handle.vmid, disk_gb);
        run("pct", &resize_args(handle.vmid, disk_gb)).await?;
        Ok(())
    }

    /// Boots the container.
    pub async fn start(&self, handle: &ContainerHandle) -> Result<(), ContainerError> {
        info!("Starting container {}", handle.vmid);
        run("pct", &start_args(handle.vmid)).await?;
        Ok(())
    }

    /// Runs a shell script inside the container and returns its stdout.
    pub async fn exec(
        &self,
        handle: &ContainerHandle,
        script: &str,
    ) -> Result<String, ContainerError> {
        debug!("Exec in {}: {}", handle.vmid, script);
        run("pct", &exec_args(handle.vmid, script)).await
    }
}

/// Spawns `tool` with `args`, blocking until it exits. Stdout is returned;
/// a non-zero status becomes an error carrying the captured stderr.
async fn run(tool: &str, args: &[String]) -> Result<String, ContainerError> {
    debug!("Running {} {:?}", tool, args);
    let output = Command::new(tool)
        .args(args)
        .output()
        .await
        .map_err(|e| ContainerError::SpawnFailed(tool.to_string(), e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let label = match args.first() {
            Some(subcommand) => format!("{} {}", tool, subcommand),
            None => tool.to_string(),
        };
        error!("{} exited with {}: {}", label, output.status, stderr);
        return Err(ContainerError::CommandFailed(label, stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

pub fn parse_vmid(stdout: &str) -> Result<u32, ContainerError> {
    stdout
        .trim()
        .parse()
        .map_err(|_| ContainerError::BadVmid(stdout.trim().to_string()))
}

pub fn create_args(vmid: u32, spec: &ContainerSpec) -> Vec<String> {
    vec![
        "create".to_string(),
        vmid.to_string(),
        spec.template_path.display().to_string(),
        "--hostname".to_string(),
        spec.hostname.clone(),
        "--cores".to_string(),
        spec.cores.to_string(),
        "--memory".to_string(),
        spec.memory_mb.to_string(),
        "--rootfs".to_string(),
        format!("{}:{}", spec.storage, BASE_ROOTFS_GB),
        "--net0".to_string(),
        format!(
            "name=eth0,bridge={},ip={},gw={}",
            spec.bridge, spec.ip, spec.gateway
        ),
        "--ostype".to_string(),
        "ubuntu".to_string(),
    ]
}

pub fn resize_args(vmid: u32, disk_gb: u32) -> Vec<String> {
    vec![
        "resize".to_string(),
        vmid.to_string(),
        "rootfs".to_string(),
        format!("{}G", disk_gb),
    ]
}

pub fn start_args(vmid: u32) -> Vec<String> {
    vec!["start".to_string(), vmid.to_string()]
}

pub fn exec_args(vmid: u32, script: &str) -> Vec<String> {
    vec![
        "exec".to_string(),
        vmid.to_string(),
        "--".to_string(),
        "bash".to_string(),
        "-lc".to_string(),
        script.to_string(),
    ]
}
