//! GitHub API surface.
//!
//! Two calls only: the public releases lookup for the latest runner
//! version, and the authenticated registration-token POST.

pub mod client;
pub mod types;

pub use client::GithubClient;
pub use types::{RegistrationToken, Release};
