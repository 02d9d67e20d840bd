use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    MissingValue(String),
    BadIpFormatting(String),
    BadGatewayFormatting(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::MissingValue(e) => write!(f, "Missing configuration value: {}", e),
            ConfigError::BadIpFormatting(e) => write!(f, "IP formatting error: {}", e),
            ConfigError::BadGatewayFormatting(e) => write!(f, "Gateway formatting error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum GithubError {
    RequestFailed(reqwest::Error),
    ApiStatus(u16, String),
    MalformedResponse(String),
}

impl fmt::Display for GithubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GithubError::RequestFailed(e) => write!(f, "GitHub request failed: {}", e),
            GithubError::ApiStatus(status, body) => {
                write!(f, "GitHub API returned {}: {}", status, body)
            }
            GithubError::MalformedResponse(e) => write!(f, "Malformed GitHub response: {}", e),
        }
    }
}

impl std::error::Error for GithubError {}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::RequestFailed(err)
    }
}

#[derive(Debug)]
pub enum TemplateError {
    RequestFailed(reqwest::Error),
    HttpStatus(u16, String),
    IoError(std::io::Error),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::RequestFailed(e) => write!(f, "Template download failed: {}", e),
            TemplateError::HttpStatus(status, url) => {
                write!(f, "Template server returned {} for {}", status, url)
            }
            TemplateError::IoError(e) => write!(f, "Template IO error: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::IoError(err)
    }
}

impl From<reqwest::Error> for TemplateError {
    fn from(err: reqwest::Error) -> Self {
        TemplateError::RequestFailed(err)
    }
}

#[derive(Debug)]
pub enum ContainerError {
    RuntimeNotAvailable,
    SpawnFailed(String, std::io::Error),
    CommandFailed(String, String),
    BadVmid(String),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::RuntimeNotAvailable => {
                write!(f, "Proxmox container tooling (pct/pvesh) not available")
            }
            ContainerError::SpawnFailed(cmd, e) => write!(f, "Failed to spawn {}: {}", cmd, e),
            ContainerError::CommandFailed(cmd, stderr) => {
                write!(f, "{} failed: {}", cmd, stderr)
            }
            ContainerError::BadVmid(e) => write!(f, "Bad VMID from hypervisor: {}", e),
        }
    }
}

impl std::error::Error for ContainerError {}

#[derive(Debug)]
pub enum InstallError {
    ContainerError(ContainerError),
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::ContainerError(e) => write!(f, "Runner install failed: {}", e),
        }
    }
}

impl std::error::Error for InstallError {}

impl From<ContainerError> for InstallError {
    fn from(err: ContainerError) -> Self {
        InstallError::ContainerError(err)
    }
}

#[derive(Debug)]
pub enum ProvisionError {
    ConfigError(ConfigError),
    GithubError(GithubError),
    TemplateError(TemplateError),
    ContainerError(ContainerError),
    InstallError(InstallError),
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::ConfigError(e) => write!(f, "Configuration error: {}", e),
            ProvisionError::GithubError(e) => write!(f, "GitHub error: {}", e),
            ProvisionError::TemplateError(e) => write!(f, "Template error: {}", e),
            ProvisionError::ContainerError(e) => write!(f, "Container error: {}", e),
            ProvisionError::InstallError(e) => write!(f, "Install error: {}", e),
        }
    }
}

impl std::error::Error for ProvisionError {}

impl From<ConfigError> for ProvisionError {
    fn from(err: ConfigError) -> Self {
        ProvisionError::ConfigError(err)
    }
}

impl From<GithubError> for ProvisionError {
    fn from(err: GithubError) -> Self {
        ProvisionError::GithubError(err)
    }
}

impl From<TemplateError> for ProvisionError {
    fn from(err: TemplateError) -> Self {
        ProvisionError::TemplateError(err)
    }
}

impl From<ContainerError> for ProvisionError {
    fn from(err: ContainerError) -> Self {
        ProvisionError::ContainerError(err)
    }
}

impl From<InstallError> for ProvisionError {
    fn from(err: InstallError) -> Self {
        ProvisionError::InstallError(err)
    }
}
