use chrono::Utc;
use log::info;

use crate::configuration::{Args, ProvisionConfig};
use crate::container_management::{ContainerSpec, PctClient};
use crate::error_handling::types::{ProvisionError, TemplateError};
use crate::github::GithubClient;
use crate::runner_install::RunnerInstaller;
use crate::template;

/// Orchestrates the provisioning flow end to end.
///
/// The flow is strictly sequential; each step blocks until its external
/// tool or HTTP call completes, and the first error aborts everything
/// after it. The downloaded template is removed only when every step
/// succeeded.
pub struct Provisioner {
    pub config: ProvisionConfig,
}

impl Provisioner {
    /// Resolves configuration from `args`, the environment, and the
    /// interactive terminal.
    pub fn new(args: &Args) -> Result<Self, ProvisionError> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let config = ProvisionConfig::resolve(args, &mut stdin.lock(), &mut stdout.lock())?;
        Ok(Provisioner { config })
    }

    /// Runs the whole flow: version lookup, template download, container
    /// create/resize/start, package install, token fetch, runner install,
    /// template cleanup.
    pub async fn run(&self) -> Result<(), ProvisionError> {
        let started = Utc::now();

        let github = GithubClient::new()?;
        let version = github.latest_runner_version().await?;

        let workdir = std::env::current_dir().map_err(TemplateError::from)?;
        let template = template::fetch_template(&self.config.template_url, &workdir).await?;

        let pct = PctClient::new()?;
        let vmid = pct.next_id().await?;
        let spec = ContainerSpec::from_config(&self.config, template.path());
        let handle = pct.create(vmid, &spec).await?;
        pct.resize_rootfs(&handle, self.config.disk_gb).await?;
        pct.start(&handle).await?;

        let installer = RunnerInstaller::new(&pct);
        installer.install_packages(&handle).await?;

        let token = github
            .registration_token(&self.config.owner_repo, &self.config.gh_token)
            .await?;

        installer
            .install_runner(
                &handle,
                &version,
                &self.config.owner_repo,
                &token,
                &self.config.runner_name,
                self.config.labels.as_deref(),
            )
            .await?;

        template.remove().await?;

        let elapsed = (Utc::now() - started).num_seconds();
        info!(
            "Provisioned container {} ({}) at {} as runner {} for {} in {}s",
            handle.vmid,
            handle.hostname,
            self.config.ip,
            self.config.runner_name,
            self.config.owner_repo,
            elapsed
        );
        Ok(())
    }
}
