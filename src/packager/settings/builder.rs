//! Builder for constructing PackagerConfig.

use super::config::{DEFAULT_OUTPUT_DIR, DEFAULT_PACKAGE_JSON, DEFAULT_PWA_MANIFEST};
use super::{AndroidSettings, IosSettings, PackagerConfig, WindowsSettings};
use crate::packager::error::{Error, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Builder for constructing [`PackagerConfig`].
///
/// # Examples
///
/// ```no_run
/// use pwa_packager::packager::PackagerConfigBuilder;
///
/// # fn example() -> pwa_packager::packager::Result<()> {
/// let config = PackagerConfigBuilder::new()
///     .project_dir(".")
///     .base_url(Some("https://example.com/".into()))
///     .run_number(Some(42))
///     .build()?;
/// assert_eq!(config.base_url().host_str(), Some("example.com"));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PackagerConfigBuilder {
    project_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    base_url: Option<String>,
    run_number: Option<u64>,
    repository: Option<String>,
    pwa_manifest_path: Option<PathBuf>,
    package_json_path: Option<PathBuf>,
    manifest_only: bool,
    android: AndroidSettings,
    ios: IosSettings,
    windows: WindowsSettings,
}

impl PackagerConfigBuilder {
    /// Creates a new config builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project directory.
    ///
    /// Default: current directory
    pub fn project_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the artifact output directory.
    ///
    /// Default: `dist`
    pub fn output_dir(mut self, path: Option<PathBuf>) -> Self {
        self.output_dir = path;
        self
    }

    /// Sets the public base URL.
    ///
    /// # Required
    ///
    /// Building fails with a missing-input error when absent or blank.
    pub fn base_url(mut self, url: Option<String>) -> Self {
        self.base_url = url;
        self
    }

    /// Sets the CI run number.
    pub fn run_number(mut self, run_number: Option<u64>) -> Self {
        self.run_number = run_number;
        self
    }

    /// Sets the CI repository slug.
    pub fn repository(mut self, repository: Option<String>) -> Self {
        self.repository = repository;
        self
    }

    /// Sets the PWA manifest path.
    ///
    /// Default: `public/manifest.json`
    pub fn pwa_manifest_path(mut self, path: Option<PathBuf>) -> Self {
        self.pwa_manifest_path = path;
        self
    }

    /// Sets the package descriptor path.
    ///
    /// Default: `package.json`
    pub fn package_json_path(mut self, path: Option<PathBuf>) -> Self {
        self.package_json_path = path;
        self
    }

    /// Stop after the platform manifest is written.
    pub fn manifest_only(mut self, manifest_only: bool) -> Self {
        self.manifest_only = manifest_only;
        self
    }

    /// Sets Android settings.
    pub fn android(mut self, settings: AndroidSettings) -> Self {
        self.android = settings;
        self
    }

    /// Sets iOS settings.
    pub fn ios(mut self, settings: IosSettings) -> Self {
        self.ios = settings;
        self
    }

    /// Sets Windows settings.
    pub fn windows(mut self, settings: WindowsSettings) -> Self {
        self.windows = settings;
        self
    }

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] when the base URL is absent and
    /// [`Error::Url`] when it does not parse.
    pub fn build(self) -> Result<PackagerConfig> {
        let raw_url = self
            .base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::MissingInput("public base URL (set PWA_BASE_URL or --base-url)".into())
            })?;
        let base_url = Url::parse(&raw_url)?;

        if base_url.host_str().is_none() {
            return Err(Error::MissingInput(format!(
                "base URL {base_url} has no host"
            )));
        }

        Ok(PackagerConfig::new(
            self.project_dir.unwrap_or_else(|| PathBuf::from(".")),
            self.output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            base_url,
            self.run_number,
            self.repository,
            self.pwa_manifest_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PWA_MANIFEST)),
            self.package_json_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGE_JSON)),
            self.manifest_only,
            self.android,
            self.ios,
            self.windows,
        ))
    }
}
