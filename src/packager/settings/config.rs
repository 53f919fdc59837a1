//! Core packaging configuration.

use super::Arch;
use std::path::{Path, PathBuf};
use url::Url;

/// Secret prefix used when no CI repository slug is configured.
pub const DEFAULT_REPOSITORY_NAME: &str = "app";

/// Default PWA manifest location, relative to the project directory.
pub const DEFAULT_PWA_MANIFEST: &str = "public/manifest.json";

/// Default package descriptor location, relative to the project directory.
pub const DEFAULT_PACKAGE_JSON: &str = "package.json";

/// Default artifact directory, relative to the project directory.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Configuration for one packaging run.
///
/// Constructed via [`PackagerConfigBuilder`](super::PackagerConfigBuilder),
/// which validates the required inputs. Relative paths are resolved against
/// the project directory.
#[derive(Clone, Debug)]
pub struct PackagerConfig {
    /// Root of the web app checkout.
    project_dir: PathBuf,

    /// Where final artifacts are copied.
    output_dir: PathBuf,

    /// Public URL the web app is served from.
    base_url: Url,

    /// CI run number, used as build number / version code.
    run_number: Option<u64>,

    /// CI repository slug (`owner/repo`).
    repository: Option<String>,

    /// PWA manifest path.
    pwa_manifest_path: PathBuf,

    /// `package.json` path.
    package_json_path: PathBuf,

    /// Stop after the platform manifest is written.
    manifest_only: bool,

    android: AndroidSettings,
    ios: IosSettings,
    windows: WindowsSettings,
}

impl PackagerConfig {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        project_dir: PathBuf,
        output_dir: PathBuf,
        base_url: Url,
        run_number: Option<u64>,
        repository: Option<String>,
        pwa_manifest_path: PathBuf,
        package_json_path: PathBuf,
        manifest_only: bool,
        android: AndroidSettings,
        ios: IosSettings,
        windows: WindowsSettings,
    ) -> Self {
        Self {
            project_dir,
            output_dir,
            base_url,
            run_number,
            repository,
            pwa_manifest_path,
            package_json_path,
            manifest_only,
            android,
            ios,
            windows,
        }
    }

    /// Returns the project directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Returns the artifact output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Returns the public base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the CI run number, if any.
    pub fn run_number(&self) -> Option<u64> {
        self.run_number
    }

    /// Returns the repository name used to prefix generated secrets.
    ///
    /// `owner/repo` yields `repo`; an absent or empty slug yields
    /// [`DEFAULT_REPOSITORY_NAME`].
    pub fn repository_name(&self) -> &str {
        self.repository
            .as_deref()
            .and_then(|slug| slug.rsplit('/').next())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_REPOSITORY_NAME)
    }

    /// Returns the resolved PWA manifest path.
    pub fn pwa_manifest_path(&self) -> PathBuf {
        self.resolve(&self.pwa_manifest_path)
    }

    /// Returns the resolved `package.json` path.
    pub fn package_json_path(&self) -> PathBuf {
        self.resolve(&self.package_json_path)
    }

    /// Whether the run stops after the platform manifest is written.
    pub fn manifest_only(&self) -> bool {
        self.manifest_only
    }

    /// Returns the Android settings.
    pub fn android(&self) -> &AndroidSettings {
        &self.android
    }

    /// Returns the iOS settings.
    pub fn ios(&self) -> &IosSettings {
        &self.ios
    }

    /// Returns the Windows settings.
    pub fn windows(&self) -> &WindowsSettings {
        &self.windows
    }

    /// Directory holding the Bubblewrap project.
    pub fn android_dir(&self) -> PathBuf {
        self.resolve(&self.android.project_dir)
    }

    /// Directory holding the XcodeGen project.
    pub fn ios_dir(&self) -> PathBuf {
        self.resolve(&self.ios.project_dir)
    }

    /// Directory holding the Windows wrapper solution.
    pub fn windows_dir(&self) -> PathBuf {
        self.resolve(&self.windows.project_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

/// Android (Trusted Web Activity) settings.
#[derive(Clone, Debug)]
pub struct AndroidSettings {
    /// Bubblewrap project directory.
    ///
    /// Default: `android`
    pub project_dir: PathBuf,

    /// Application id.
    ///
    /// Default: None (reversed host + `.twa`)
    pub package_id: Option<String>,

    /// Keystore password override.
    ///
    /// Default: None (cached or generated)
    pub keystore_password: Option<String>,

    /// JDK used by Bubblewrap.
    ///
    /// Default: None (Bubblewrap config is left untouched)
    pub jdk_path: Option<PathBuf>,

    /// Android SDK used by Bubblewrap.
    ///
    /// Default: None
    pub sdk_path: Option<PathBuf>,
}

impl Default for AndroidSettings {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("android"),
            package_id: None,
            keystore_password: None,
            jdk_path: None,
            sdk_path: None,
        }
    }
}

/// iOS wrapper app settings.
#[derive(Clone, Debug)]
pub struct IosSettings {
    /// XcodeGen project directory.
    ///
    /// Default: `ios`
    pub project_dir: PathBuf,

    /// Bundle identifier.
    ///
    /// Default: None (reversed host + `.ios`)
    pub bundle_id: Option<String>,

    /// Apple development team.
    ///
    /// Default: None
    pub team_id: Option<String>,

    /// Build keychain password override.
    ///
    /// Default: None (cached or generated)
    pub keychain_password: Option<String>,

    /// Base64-encoded PKCS#12 signing certificate.
    ///
    /// Default: None (unsigned build)
    pub certificate_base64: Option<String>,

    /// Password of the PKCS#12 certificate.
    ///
    /// Default: None
    pub certificate_password: Option<String>,

    /// Minimum iOS version.
    ///
    /// Default: `15.0`
    pub deployment_target: String,
}

impl Default for IosSettings {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("ios"),
            bundle_id: None,
            team_id: None,
            keychain_password: None,
            certificate_base64: None,
            certificate_password: None,
            deployment_target: "15.0".to_string(),
        }
    }
}

/// Windows (MSIX) wrapper app settings.
#[derive(Clone, Debug)]
pub struct WindowsSettings {
    /// Wrapper solution directory.
    ///
    /// Default: `windows`
    pub project_dir: PathBuf,

    /// MSIX identity name.
    ///
    /// Default: None (reversed host + `.pwa`)
    pub identity_name: Option<String>,

    /// Publisher common name, used for the identity and the certificate.
    ///
    /// Default: `PWA Packager`
    pub publisher: String,

    /// Certificate password override.
    ///
    /// Default: None (cached or generated)
    pub certificate_password: Option<String>,

    /// Solution file, relative to the project directory.
    ///
    /// Default: `App.sln`
    pub solution: PathBuf,

    /// Target architecture.
    ///
    /// Default: [`Arch::X86_64`]
    pub arch: Arch,
}

impl Default for WindowsSettings {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("windows"),
            identity_name: None,
            publisher: "PWA Packager".to_string(),
            certificate_password: None,
            solution: PathBuf::from("App.sln"),
            arch: Arch::default(),
        }
    }
}
