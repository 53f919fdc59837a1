//! Packaging orchestration.
//!
//! The [`Packager`] drives one [`PlatformBuilder`](crate::packager::platform::PlatformBuilder)
//! through its steps and returns [`PackagedArtifact`](crate::packager::PackagedArtifact)
//! results with size and SHA-256 checksum.
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`orchestrator`] - Main [`Packager`] struct
//! - [`tool_detection`] - External tool availability checking

mod checksum;
mod orchestrator;
pub mod tool_detection;

pub use checksum::calculate_sha256;
pub use orchestrator::Packager;
