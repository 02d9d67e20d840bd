use log::{debug, info};
use reqwest::Client;

use crate::error_handling::types::GithubError;
use crate::github::types::{RegistrationToken, Release};

const API_BASE: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github+json";

/// Thin client for the two GitHub API calls the provisioner makes.
pub struct GithubClient {
    http: Client,
    api_base: String,
}

impl GithubClient {
    /// Creates a client. GitHub rejects requests without a `User-Agent`,
    /// so one is set on the underlying HTTP client.
    pub fn new() -> Result<Self, GithubError> {
        let http = Client::builder()
            .user_agent(concat!("runnerbox/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(GithubClient {
            http,
            api_base: API_BASE.to_string(),
        })
    }

    /// Resolves the latest `actions/runner` release version, without the
    /// `v` tag prefix.
    pub async fn latest_runner_version(&self) -> Result<String, GithubError> {
        let url = format!("{}/repos/actions/runner/releases/latest", self.api_base);
        debug!("Fetching latest runner release: {}", url);

        let response = self.http.get(&url).header("Accept", ACCEPT).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GithubError::ApiStatus(status, body));
        }

        let body = response.text().await?;
        let release = parse_release(&body)?;
        let version = version_from_tag(&release.tag_name);
        info!("Latest runner version: {}", version);
        Ok(version)
    }

    /// Obtains a short-lived registration token for `owner_repo`.
    ///
    /// The POST is authenticated with the user-supplied GitHub token; the
    /// response token is returned bare, exactly as GitHub minted it.
    pub async fn registration_token(
        &self,
        owner_repo: &str,
        gh_token: &str,
    ) -> Result<String, GithubError> {
        let url = format!(
            "{}/repos/{}/actions/runners/registration-token",
            self.api_base, owner_repo
        );
        debug!("Requesting registration token for {}", owner_repo);

        let response = self
            .http
            .post(&url)
            .header("Accept", ACCEPT)
            .header("Authorization", format!("token {}", gh_token))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GithubError::ApiStatus(status, body));
        }

        let body = response.text().await?;
        let registration = parse_registration_token(&body)?;
        info!(
            "Registration token obtained (expires {})",
            registration.expires_at
        );
        Ok(registration.token)
    }
}

/// Strips the `v` prefix GitHub puts on runner release tags.
pub fn version_from_tag(tag: &str) -> String {
    tag.trim_start_matches('v').to_string()
}

pub fn parse_release(body: &str) -> Result<Release, GithubError> {
    serde_json::from_str(body).map_err(|e| GithubError::MalformedResponse(e.to_string()))
}

pub fn parse_registration_token(body: &str) -> Result<RegistrationToken, GithubError> {
    serde_json::from_str(body).map_err(|e| GithubError::MalformedResponse(e.to_string()))
}
