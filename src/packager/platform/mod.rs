//! Platform builders.
//!
//! Each target platform implements [`PlatformBuilder`]. The
//! [`Packager`](crate::packager::builder::Packager) drives the steps in
//! order and stops at the first error:
//!
//! 1. [`validate_inputs`](PlatformBuilder::validate_inputs) - load and check
//!    every input and required tool; writes nothing
//! 2. [`write_manifest`](PlatformBuilder::write_manifest) - write the
//!    platform manifest
//! 3. [`stage`](PlatformBuilder::stage) - credentials and icon assets
//! 4. [`invoke`](PlatformBuilder::invoke) - run the external build tools
//! 5. [`package`](PlatformBuilder::package) - collect the distributables

pub mod android;
pub mod ios;
pub mod windows;

use crate::packager::error::Result;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub use android::AndroidBuilder;
pub use ios::IosBuilder;
pub use windows::WindowsBuilder;

/// A packaging target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Windows,
}

impl Platform {
    /// Every supported platform.
    pub const ALL: [Platform; 3] = [Platform::Android, Platform::Ios, Platform::Windows];
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Windows => "windows",
        })
    }
}

/// The build steps of one platform.
///
/// `Resolved` is everything `validate_inputs` proved available; `Staged`
/// adds provisioned credentials and generated assets.
#[allow(async_fn_in_trait)]
pub trait PlatformBuilder {
    type Resolved;
    type Staged;

    fn platform(&self) -> Platform;

    /// Tools that must be on `PATH` for a full build.
    fn required_tools(&self) -> &'static [&'static str];

    /// Loads inputs and resolves the platform manifest without writing.
    async fn validate_inputs(&self) -> Result<Self::Resolved>;

    /// Writes the platform manifest files.
    async fn write_manifest(&self, resolved: &Self::Resolved) -> Result<Vec<PathBuf>>;

    /// Provisions credentials and generates assets.
    async fn stage(&self, resolved: Self::Resolved) -> Result<Self::Staged>;

    /// Runs the external build tools.
    async fn invoke(&self, staged: &Self::Staged) -> Result<()>;

    /// Copies the distributables into the output directory.
    async fn package(&self, staged: &Self::Staged) -> Result<Vec<PathBuf>>;

    /// Undoes machine-wide changes made by `stage`. Runs whether or not the
    /// build succeeded.
    async fn cleanup(&self, _staged: &Self::Staged) {}
}
