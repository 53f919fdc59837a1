//! Packaging of a built web app into Android, iOS and Windows distributables.
//!
//! This module wraps a Progressive Web App into:
//! - an Android Trusted Web Activity (APK and App Bundle, via Bubblewrap)
//! - an iOS web view app (IPA, via XcodeGen and xcodebuild)
//! - a Windows web view app (MSIX, via MSBuild)
//!
//! # Example
//!
//! ```no_run
//! use pwa_packager::packager::{Packager, PackagerConfigBuilder, Platform};
//!
//! # async fn example() -> pwa_packager::packager::Result<()> {
//! let config = PackagerConfigBuilder::new()
//!     .project_dir("web")
//!     .base_url(Some("https://example.com/".into()))
//!     .build()?;
//!
//! let artifacts = Packager::new(config).package(Platform::Windows).await?;
//! println!("Created {} packages", artifacts.len());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod credentials;
pub mod error;
pub mod icons;
pub mod manifest;
pub mod platform;
pub mod settings;
pub mod utils;

pub use builder::Packager;
pub use error::{Context, Error, ErrorExt, Result};
pub use platform::{Platform, PlatformBuilder};
pub use settings::{
    AndroidSettings, Arch, IosSettings, PackagerConfig, PackagerConfigBuilder, WindowsSettings,
};

use serde::Serialize;
use std::path::PathBuf;

/// A final distributable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackagedArtifact {
    /// Platform the artifact was built for.
    pub platform: Platform,
    /// Location in the output directory.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 checksum.
    pub checksum: String,
}
