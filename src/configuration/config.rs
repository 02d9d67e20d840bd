use clap::Parser;
use log::{debug, info};
use regex::Regex;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use uuid::Uuid;

use crate::configuration::types::*;
use crate::error_handling::types::ConfigError;

/// Command-line arguments accepted by the provisioner.
///
/// Every input can be given as a flag; the token and repository also fall
/// back to the `GH_TOKEN` / `OWNERREPO` environment variables. Anything
/// still unset after flags, environment and the optional defaults file is
/// asked for interactively by [`ProvisionConfig::resolve`].
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "runnerbox")]
#[command(version)]
#[command(about = "Provision a Proxmox LXC container as a self-hosted GitHub Actions runner")]
pub struct Args {
    /// GitHub token used to mint the runner registration token.
    ///
    /// # Command Line
    /// Use `--gh-token <TOKEN>` or set `GH_TOKEN` in the environment
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// Target repository in `owner/repo` form.
    ///
    /// # Command Line
    /// Use `--owner-repo <OWNER/REPO>` or set `OWNERREPO` in the environment
    #[arg(long, env = "OWNERREPO")]
    pub owner_repo: Option<String>,

    /// Container address in CIDR notation, e.g. `192.168.1.101/24`.
    #[arg(long)]
    pub ip: Option<String>,

    /// Gateway address for the container network.
    #[arg(long)]
    pub gateway: Option<String>,

    #[arg(long)]
    pub hostname: Option<String>,

    #[arg(long)]
    pub cores: Option<u16>,

    /// Memory limit in MiB.
    #[arg(long)]
    pub memory: Option<u32>,

    /// Rootfs size in GiB the container is resized to after creation.
    #[arg(long)]
    pub disk: Option<u32>,

    /// Proxmox storage pool for the container rootfs.
    #[arg(long)]
    pub storage: Option<String>,

    /// Network bridge the container NIC attaches to.
    #[arg(long)]
    pub bridge: Option<String>,

    /// Overrides the LXC template image URL.
    #[arg(long)]
    pub template_url: Option<String>,

    /// Runner name registered with GitHub. Defaults to `runnerbox-<suffix>`.
    #[arg(long)]
    pub runner_name: Option<String>,

    /// Extra comma-separated labels for the runner.
    #[arg(long)]
    pub labels: Option<String>,

    /// Optional TOML file with sizing/network defaults.
    ///
    /// # Command Line
    /// Use `--config-file <PATH>`. Flags and environment variables win
    /// over file values
    #[arg(long)]
    pub config_file: Option<PathBuf>,
}

static IP_CIDR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})/(\d{1,2})$")
        .expect("CIDR regex is valid")
});

static GATEWAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$").expect("gateway regex is valid")
});

impl FileDefaults {
    /// Loads defaults from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ConfigError::TomlError(e.to_string()))
    }
}

impl ProvisionConfig {
    /// Resolves the final configuration from flags/environment, the
    /// optional defaults file, and interactive prompts.
    ///
    /// Resolution order per value: flag (or its environment variable) wins,
    /// then the defaults file, then the interactive prompt. The token and
    /// repository never come from the file and are prompted for until
    /// non-empty; IP and gateway prompts substitute the stated defaults
    /// when answered blank.
    pub fn resolve<R: BufRead, W: Write>(
        args: &Args,
        input: &mut R,
        output: &mut W,
    ) -> Result<Self, ConfigError> {
        let file = match &args.config_file {
            Some(path) => {
                info!("Loading defaults file: {}", path.display());
                FileDefaults::from_file(path)?
            }
            None => FileDefaults::default(),
        };

        let gh_token = match non_empty(&args.gh_token) {
            Some(v) => v,
            None => prompt_required(input, output, "GitHub token (repo scope)")?,
        };
        let owner_repo = match non_empty(&args.owner_repo) {
            Some(v) => v,
            None => prompt_required(input, output, "Repository (owner/repo)")?,
        };

        let ip = match non_empty(&args.ip).or(file.ip.clone()) {
            Some(v) => v,
            None => prompt_with_default(input, output, "Container IP (CIDR)", DEFAULT_IP)?,
        };
        let gateway = match non_empty(&args.gateway).or(file.gateway.clone()) {
            Some(v) => v,
            None => prompt_with_default(input, output, "Gateway", DEFAULT_GATEWAY)?,
        };

        validate_ip_cidr(&ip)?;
        validate_gateway(&gateway)?;

        let hostname = non_empty(&args.hostname)
            .or(file.hostname.clone())
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());
        let cores = args.cores.or(file.cores).unwrap_or(DEFAULT_CORES);
        let memory_mb = args.memory.or(file.memory_mb).unwrap_or(DEFAULT_MEMORY_MB);
        let disk_gb = args.disk.or(file.disk_gb).unwrap_or(DEFAULT_DISK_GB);
        let storage = non_empty(&args.storage)
            .or(file.storage.clone())
            .unwrap_or_else(|| DEFAULT_STORAGE.to_string());
        let bridge = non_empty(&args.bridge)
            .or(file.bridge.clone())
            .unwrap_or_else(|| DEFAULT_BRIDGE.to_string());
        let template_url = non_empty(&args.template_url)
            .or(file.template_url.clone())
            .unwrap_or_else(|| DEFAULT_TEMPLATE_URL.to_string());

        if cores == 0 {
            return Err(ConfigError::NotInRange("cores must be at least 1".to_string()));
        }
        if memory_mb == 0 {
            return Err(ConfigError::NotInRange("memory must be at least 1 MiB".to_string()));
        }
        if disk_gb == 0 {
            return Err(ConfigError::NotInRange("disk must be at least 1 GiB".to_string()));
        }

        let runner_name = non_empty(&args.runner_name).unwrap_or_else(|| {
            format!("runnerbox-{}", &Uuid::new_v4().to_string()[..8])
        });

        debug!(
            "Resolved configuration: repo={}, ip={}, gw={}, hostname={}, runner={}",
            owner_repo, ip, gateway, hostname, runner_name
        );

        Ok(ProvisionConfig {
            gh_token,
            owner_repo,
            ip,
            gateway,
            hostname,
            cores,
            memory_mb,
            disk_gb,
            storage,
            bridge,
            template_url,
            runner_name,
            labels: non_empty(&args.labels),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Prompts until a non-empty line is read. EOF on the input is an error
/// rather than an empty value.
fn prompt_required<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<String, ConfigError> {
    loop {
        write!(output, "{}: ", label)?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(ConfigError::MissingValue(label.to_string()));
        }
        let value = line.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }
}

/// Prompts once; a blank answer substitutes `default`.
fn prompt_with_default<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    default: &str,
) -> Result<String, ConfigError> {
    write!(output, "{} [{}]: ", label, default)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let value = line.trim();
    if value.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(value.to_string())
    }
}

fn validate_ip_cidr(value: &str) -> Result<(), ConfigError> {
    let caps = IP_CIDR_RE
        .captures(value)
        .ok_or_else(|| ConfigError::BadIpFormatting(value.to_string()))?;
    for i in 1..=4 {
        let octet: u16 = caps[i]
            .parse()
            .map_err(|_| ConfigError::BadIpFormatting(value.to_string()))?;
        if octet > 255 {
            return Err(ConfigError::BadIpFormatting(value.to_string()));
        }
    }
    let prefix: u8 = caps[5]
        .parse()
        .map_err(|_| ConfigError::BadIpFormatting(value.to_string()))?;
    if prefix > 32 {
        return Err(ConfigError::BadIpFormatting(value.to_string()));
    }
    Ok(())
}

fn validate_gateway(value: &str) -> Result<(), ConfigError> {
    let caps = GATEWAY_RE
        .captures(value)
        .ok_or_else(|| ConfigError::BadGatewayFormatting(value.to_string()))?;
    for i in 1..=4 {
        let octet: u16 = caps[i]
            .parse()
            .map_err(|_| ConfigError::BadGatewayFormatting(value.to_string()))?;
        if octet > 255 {
            return Err(ConfigError::BadGatewayFormatting(value.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn args_with_credentials() -> Args {
        Args {
            gh_token: Some("ghp_test".to_string()),
            owner_repo: Some("octo/widgets".to_string()),
            ..Args::default()
        }
    }

    #[test]
    fn test_blank_prompts_substitute_network_defaults() {
        let args = args_with_credentials();
        let mut input = Cursor::new("\n\n");
        let mut output = Vec::new();

        let config = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap();

        assert_eq!(config.ip, DEFAULT_IP);
        assert_eq!(config.gateway, DEFAULT_GATEWAY);
        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("[192.168.1.101/24]"));
        assert!(prompts.contains("[192.168.1.1]"));
    }

    #[test]
    fn test_missing_credentials_are_prompted() {
        let args = Args::default();
        let mut input = Cursor::new("ghp_prompted\nocto/widgets\n\n\n");
        let mut output = Vec::new();

        let config = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap();

        assert_eq!(config.gh_token, "ghp_prompted");
        assert_eq!(config.owner_repo, "octo/widgets");
        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("GitHub token"));
        assert!(prompts.contains("Repository"));
    }

    #[test]
    fn test_empty_credential_lines_are_asked_again() {
        let args = Args::default();
        // Two blank answers before the real token
        let mut input = Cursor::new("\n\nghp_eventually\nocto/widgets\n\n\n");
        let mut output = Vec::new();

        let config = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap();

        assert_eq!(config.gh_token, "ghp_eventually");
    }

    #[test]
    fn test_credential_eof_is_an_error() {
        let args = Args::default();
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let err = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap_err();

        assert!(matches!(err, ConfigError::MissingValue(_)));
    }

    #[test]
    fn test_flags_win_over_prompts() {
        let mut args = args_with_credentials();
        args.ip = Some("10.0.0.5/16".to_string());
        args.gateway = Some("10.0.0.1".to_string());
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let config = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap();

        assert_eq!(config.ip, "10.0.0.5/16");
        assert_eq!(config.gateway, "10.0.0.1");
        // Nothing was prompted
        assert!(output.is_empty());
    }

    #[test]
    fn test_malformed_ip_is_rejected() {
        let mut args = args_with_credentials();
        args.gateway = Some("192.168.1.1".to_string());
        for bad in ["192.168.1.101", "300.0.0.1/24", "192.168.1.101/40", "not-an-ip/24"] {
            args.ip = Some(bad.to_string());
            let mut input = Cursor::new("");
            let mut output = Vec::new();
            let err = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap_err();
            assert!(matches!(err, ConfigError::BadIpFormatting(_)), "accepted {}", bad);
        }
    }

    #[test]
    fn test_malformed_gateway_is_rejected() {
        let mut args = args_with_credentials();
        args.ip = Some("192.168.1.101/24".to_string());
        args.gateway = Some("192.168.1.1/24".to_string());
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let err = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap_err();

        assert!(matches!(err, ConfigError::BadGatewayFormatting(_)));
    }

    #[test]
    fn test_sizing_defaults() {
        let args = args_with_credentials();
        let mut input = Cursor::new("\n\n");
        let mut output = Vec::new();

        let config = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap();

        assert_eq!(config.hostname, DEFAULT_HOSTNAME);
        assert_eq!(config.cores, DEFAULT_CORES);
        assert_eq!(config.memory_mb, DEFAULT_MEMORY_MB);
        assert_eq!(config.disk_gb, DEFAULT_DISK_GB);
        assert_eq!(config.storage, DEFAULT_STORAGE);
        assert_eq!(config.bridge, DEFAULT_BRIDGE);
        assert_eq!(config.template_url, DEFAULT_TEMPLATE_URL);
        assert!(config.runner_name.starts_with("runnerbox-"));
    }

    #[test]
    fn test_zero_cores_rejected() {
        let mut args = args_with_credentials();
        args.cores = Some(0);
        let mut input = Cursor::new("\n\n");
        let mut output = Vec::new();

        let err = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap_err();

        assert!(matches!(err, ConfigError::NotInRange(_)));
    }

    #[test]
    fn test_defaults_file_fills_unset_values() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "ip = \"172.16.0.9/12\"\ngateway = \"172.16.0.1\"\ncores = 4\nstorage = \"tank\""
        )
        .unwrap();

        let mut args = args_with_credentials();
        args.config_file = Some(file.path().to_path_buf());
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let config = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap();

        assert_eq!(config.ip, "172.16.0.9/12");
        assert_eq!(config.gateway, "172.16.0.1");
        assert_eq!(config.cores, 4);
        assert_eq!(config.storage, "tank");
        // File did not set these
        assert_eq!(config.memory_mb, DEFAULT_MEMORY_MB);
        assert!(output.is_empty());
    }

    #[test]
    fn test_defaults_file_bad_toml() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cores = \"four\"").unwrap();

        let mut args = args_with_credentials();
        args.config_file = Some(file.path().to_path_buf());
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let err = ProvisionConfig::resolve(&args, &mut input, &mut output).unwrap_err();

        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    #[serial_test::serial]
    fn test_env_fallback_for_credentials() {
        std::env::set_var("GH_TOKEN", "ghp_env");
        std::env::set_var("OWNERREPO", "env/widgets");

        let args = Args::try_parse_from(["runnerbox"]).unwrap();

        std::env::remove_var("GH_TOKEN");
        std::env::remove_var("OWNERREPO");

        assert_eq!(args.gh_token.as_deref(), Some("ghp_env"));
        assert_eq!(args.owner_repo.as_deref(), Some("env/widgets"));
    }

    #[test]
    #[serial_test::serial]
    fn test_try_parse_from_flags() {
        let args = Args::try_parse_from([
            "runnerbox",
            "--gh-token",
            "ghp_cli",
            "--owner-repo",
            "octo/widgets",
            "--ip",
            "192.168.7.20/24",
            "--gateway",
            "192.168.7.1",
            "--cores",
            "8",
        ])
        .unwrap();

        assert_eq!(args.gh_token.as_deref(), Some("ghp_cli"));
        assert_eq!(args.owner_repo.as_deref(), Some("octo/widgets"));
        assert_eq!(args.ip.as_deref(), Some("192.168.7.20/24"));
        assert_eq!(args.cores, Some(8));
    }
}
