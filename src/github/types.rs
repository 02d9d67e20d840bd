//! Response types for the GitHub API calls.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Subset of the releases API response the provisioner cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag, e.g. `v2.321.0`.
    pub tag_name: String,
}

/// Body returned by the registration-token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationToken {
    /// Short-lived token binding one runner to the repository.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
