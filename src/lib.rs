pub mod configuration;
pub mod container_management;
pub mod controller;
pub mod error_handling;
pub mod github;
pub mod runner_install;
pub mod template;
