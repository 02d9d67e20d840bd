pub mod installer;

pub use installer::RunnerInstaller;
