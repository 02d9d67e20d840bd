//! Container management subsystem.
//!
//! This module exposes a minimal API to create and manage the LXC
//! container the runner lives in. The implementation targets the Proxmox
//! CLI (`pct` and `pvesh`) and covers exactly the lifecycle the
//! provisioning flow needs: id allocation, create, resize, start, exec.
//!
//! Re-exports:
//! - [`PctClient`]: main entry point for hypervisor calls.
//! - [`ContainerHandle`], [`ContainerSpec`]: core types.

pub mod pct;
pub mod types;

pub use pct::PctClient;
pub use types::{ContainerHandle, ContainerSpec};
