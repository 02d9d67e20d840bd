use log::info;

use crate::container_management::{ContainerHandle, PctClient};
use crate::error_handling::types::InstallError;

/// Dedicated user the runner is configured under. `config.sh` refuses to
/// run as root, so configuration happens through `runuser`.
pub const RUNNER_USER: &str = "ghrunner";
pub const RUNNER_DIR: &str = "/home/ghrunner/actions-runner";

/// Drives the in-container steps that turn a booted LXC into a registered
/// runner. Every step is one `pct exec` shell invocation; the first failure
/// aborts the sequence.
pub struct RunnerInstaller<'a> {
    pct: &'a PctClient,
}

impl<'a> RunnerInstaller<'a> {
    pub fn new(pct: &'a PctClient) -> Self {
        RunnerInstaller { pct }
    }

    /// Installs the OS packages the runner setup depends on.
    pub async fn install_packages(&self, handle: &ContainerHandle) -> Result<(), InstallError> {
        info!("Installing OS packages in container {}", handle.vmid);
        self.pct.exec(handle, &os_packages_script()).await?;
        Ok(())
    }

    /// Downloads, configures and starts the runner service inside the
    /// container. The archive stays in the container after unpacking.
    pub async fn install_runner(
        &self,
        handle: &ContainerHandle,
        version: &str,
        owner_repo: &str,
        registration_token: &str,
        runner_name: &str,
        labels: Option<&str>,
    ) -> Result<(), InstallError> {
        info!("Creating runner user {}", RUNNER_USER);
        self.pct.exec(handle, &create_user_script()).await?;

        info!("Downloading runner {} into container {}", version, handle.vmid);
        self.pct.exec(handle, &download_script(version)).await?;

        info!("Registering runner {} with {}", runner_name, owner_repo);
        let configure = configure_script(owner_repo, registration_token, runner_name, labels);
        self.pct.exec(handle, &configure).await?;

        info!("Installing and starting the runner service");
        self.pct.exec(handle, &service_script()).await?;
        Ok(())
    }
}

/// Download URL for a runner release, mirroring GitHub's asset naming.
pub fn runner_archive_url(version: &str) -> String {
    format!(
        "https://github.com/actions/runner/releases/download/v{v}/actions-runner-linux-x64-{v}.tar.gz",
        v = version
    )
}

pub fn os_packages_script() -> String {
    "export DEBIAN_FRONTEND=noninteractive && apt-get update && apt-get install -y curl tar sudo"
        .to_string()
}

pub fn create_user_script() -> String {
    format!(
        "id -u {user} >/dev/null 2>&1 || useradd -m -s /bin/bash {user}",
        user = RUNNER_USER
    )
}

pub fn download_script(version: &str) -> String {
    format!(
        "mkdir -p {dir} && curl -fsSL -o {dir}/actions-runner.tar.gz {url} && tar -xzf {dir}/actions-runner.tar.gz -C {dir} && chown -R {user}:{user} /home/{user}",
        dir = RUNNER_DIR,
        url = runner_archive_url(version),
        user = RUNNER_USER
    )
}

pub fn configure_script(
    owner_repo: &str,
    registration_token: &str,
    runner_name: &str,
    labels: Option<&str>,
) -> String {
    let labels_flag = match labels {
        Some(labels) => format!(" --labels {}", labels),
        None => String::new(),
    };
    format!(
        "cd {dir} && runuser -u {user} -- ./config.sh --unattended --url https://github.com/{repo} --token {token} --name {name}{labels}",
        dir = RUNNER_DIR,
        user = RUNNER_USER,
        repo = owner_repo,
        token = registration_token,
        name = runner_name,
        labels = labels_flag
    )
}

/// `svc.sh` must run as root; it installs the systemd unit for the
/// configured user.
pub fn service_script() -> String {
    format!(
        "cd {dir} && ./svc.sh install {user} && ./svc.sh start",
        dir = RUNNER_DIR,
        user = RUNNER_USER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_archive_url() {
        assert_eq!(
            runner_archive_url("2.321.0"),
            "https://github.com/actions/runner/releases/download/v2.321.0/actions-runner-linux-x64-2.321.0.tar.gz"
        );
    }

    #[test]
    fn test_download_script_leaves_the_archive() {
        let script = download_script("2.321.0");
        assert!(script.contains("actions-runner.tar.gz"));
        assert!(script.contains("tar -xzf"));
        // The archive stays in the container
        assert!(!script.contains("rm "));
    }

    #[test]
    fn test_configure_script_carries_the_bare_token() {
        let script = configure_script("octo/widgets", "AABF3JGZ", "runnerbox-1a2b3c4d", None);
        assert!(script.contains("--url https://github.com/octo/widgets"));
        assert!(script.contains("--token AABF3JGZ"));
        assert!(script.contains("--name runnerbox-1a2b3c4d"));
        assert!(script.contains("--unattended"));
        assert!(!script.contains("--labels"));
    }

    #[test]
    fn test_configure_script_appends_labels_when_given() {
        let script = configure_script("octo/widgets", "TOK", "r1", Some("proxmox,lxc"));
        assert!(script.ends_with("--labels proxmox,lxc"));
    }

    #[test]
    fn test_create_user_script_is_idempotent() {
        let script = create_user_script();
        assert!(script.starts_with("id -u ghrunner"));
        assert!(script.contains("|| useradd -m"));
    }

    #[test]
    fn test_service_script_runs_as_root_for_the_runner_user() {
        let script = service_script();
        assert!(script.contains("./svc.sh install ghrunner"));
        assert!(script.ends_with("./svc.sh start"));
    }
}
