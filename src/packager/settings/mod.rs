//! Configuration for packaging runs.
//!
//! Every option the packager recognizes lives in [`PackagerConfig`] and its
//! per-platform sections. Components receive the config explicitly; nothing
//! below the CLI reads environment variables.

mod arch;
mod builder;
mod config;
mod web;

pub use arch::Arch;
pub use builder::PackagerConfigBuilder;
pub use config::{AndroidSettings, IosSettings, PackagerConfig, WindowsSettings};
pub use web::{PackageDescriptor, PwaIcon, PwaManifest};
