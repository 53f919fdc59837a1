//! Command line argument parsing and validation.
//!
//! Every option falls back to the environment variable a CI workflow
//! exports, so `pwa_packager android` is usually enough on a runner.

use crate::error::CliError;
use crate::packager::{
    AndroidSettings, Arch, IosSettings, PackagerConfig, PackagerConfigBuilder, Platform,
    WindowsSettings,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Progressive web app packager for Android, iOS and Windows
#[derive(Parser, Debug)]
#[command(
    name = "pwa_packager",
    version,
    about = "Wraps a built progressive web app into Android, iOS and Windows packages",
    long_about = "Wraps a built progressive web app into platform packages.

  android  Trusted Web Activity APK and App Bundle via Bubblewrap
  ios      Web view app IPA via XcodeGen and xcodebuild
  windows  Web view app MSIX via MSBuild

Usage:
  PWA_BASE_URL=https://example.com/ pwa_packager android
  pwa_packager --project-dir web ios --base-url https://example.com/
  pwa_packager windows --manifest-only

Exit code 0 = every artifact exists in the output directory."
)]
pub struct Args {
    /// Root of the web app checkout
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Where artifacts are copied (default: <project-dir>/dist)
    #[arg(short = 'o', long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the artifact list as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Target platform
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Android Trusted Web Activity (APK + AAB)
    Android(AndroidArgs),
    /// iOS web view app (IPA)
    Ios(IosArgs),
    /// Windows web view app (MSIX)
    Windows(WindowsArgs),
}

/// Options shared by every platform
#[derive(clap::Args, Debug)]
pub struct CommonArgs {
    /// Public URL the web app is served from
    #[arg(long, env = "PWA_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Build number (Android version code, iOS build, Windows 4th part)
    #[arg(long, env = "GITHUB_RUN_NUMBER", value_name = "N")]
    pub run_number: Option<u64>,

    /// Repository slug `owner/repo`; its name prefixes generated secrets
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "SLUG")]
    pub repository: Option<String>,

    /// PWA manifest (default: public/manifest.json)
    #[arg(long, env = "PWA_MANIFEST_PATH", value_name = "PATH")]
    pub pwa_manifest: Option<PathBuf>,

    /// Package descriptor (default: package.json)
    #[arg(long, env = "PACKAGE_JSON_PATH", value_name = "PATH")]
    pub package_json: Option<PathBuf>,

    /// Stop after the platform manifest is written
    #[arg(long)]
    pub manifest_only: bool,
}

/// Android options
#[derive(clap::Args, Debug)]
pub struct AndroidArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Bubblewrap project directory (default: android)
    #[arg(long, value_name = "DIR")]
    pub android_dir: Option<PathBuf>,

    /// Application id (default: reversed host + .twa)
    #[arg(long, env = "ANDROID_PACKAGE_ID", value_name = "ID")]
    pub package_id: Option<String>,

    /// Keystore password (default: cached or generated)
    #[arg(long, env = "ANDROID_KEYSTORE_PASSWORD", hide_env_values = true)]
    pub keystore_password: Option<String>,

    /// JDK for Bubblewrap
    #[arg(long, env = "JAVA_HOME", value_name = "DIR")]
    pub jdk_path: Option<PathBuf>,

    /// Android SDK for Bubblewrap
    #[arg(long, env = "ANDROID_HOME", value_name = "DIR")]
    pub sdk_path: Option<PathBuf>,
}

/// iOS options
#[derive(clap::Args, Debug)]
pub struct IosArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// XcodeGen project directory (default: ios)
    #[arg(long, value_name = "DIR")]
    pub ios_dir: Option<PathBuf>,

    /// Bundle identifier (default: reversed host + .ios)
    #[arg(long, env = "IOS_BUNDLE_ID", value_name = "ID")]
    pub bundle_id: Option<String>,

    /// Apple development team
    #[arg(long, env = "IOS_TEAM_ID", value_name = "TEAM")]
    pub team_id: Option<String>,

    /// Build keychain password (default: cached or generated)
    #[arg(long, env = "IOS_KEYCHAIN_PASSWORD", hide_env_values = true)]
    pub keychain_password: Option<String>,

    /// Base64 PKCS#12 signing certificate (default: unsigned build)
    #[arg(long, env = "IOS_CERTIFICATE_BASE64", hide_env_values = true)]
    pub certificate_base64: Option<String>,

    /// Password of the signing certificate
    #[arg(long, env = "IOS_CERTIFICATE_PASSWORD", hide_env_values = true)]
    pub certificate_password: Option<String>,

    /// Minimum iOS version
    #[arg(long, default_value = "15.0", value_name = "VERSION")]
    pub deployment_target: String,
}

/// Windows options
#[derive(clap::Args, Debug)]
pub struct WindowsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Wrapper solution directory (default: windows)
    #[arg(long, value_name = "DIR")]
    pub windows_dir: Option<PathBuf>,

    /// MSIX identity name (default: reversed host + .pwa)
    #[arg(long, env = "WINDOWS_IDENTITY_NAME", value_name = "NAME")]
    pub identity_name: Option<String>,

    /// Publisher common name
    #[arg(long, env = "WINDOWS_PUBLISHER", default_value = "PWA Packager")]
    pub publisher: String,

    /// Certificate password (default: cached or generated)
    #[arg(long, env = "WINDOWS_CERTIFICATE_PASSWORD", hide_env_values = true)]
    pub certificate_password: Option<String>,

    /// Solution file, relative to the windows directory
    #[arg(long, env = "WINDOWS_SOLUTION", default_value = "App.sln", value_name = "PATH")]
    pub solution: PathBuf,

    /// Target architecture
    #[arg(long, env = "WINDOWS_ARCH", value_enum, default_value_t = Arch::X86_64)]
    pub arch: Arch,
}

impl Args {
    /// Parse command line arguments
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        if !self.project_dir.is_dir() {
            return Err(CliError::InvalidArguments {
                reason: format!(
                    "project directory {} does not exist",
                    self.project_dir.display()
                ),
            });
        }
        Ok(())
    }

    /// Platform selected by the subcommand.
    pub fn platform(&self) -> Platform {
        match self.command {
            Command::Android(_) => Platform::Android,
            Command::Ios(_) => Platform::Ios,
            Command::Windows(_) => Platform::Windows,
        }
    }

    /// Assembles the packaging configuration.
    pub fn into_config(self) -> crate::packager::Result<PackagerConfig> {
        let builder = PackagerConfigBuilder::new()
            .project_dir(&self.project_dir)
            .output_dir(self.output_dir);

        match self.command {
            Command::Android(android) => {
                let mut settings = AndroidSettings {
                    package_id: android.package_id,
                    keystore_password: android.keystore_password,
                    jdk_path: android.jdk_path,
                    sdk_path: android.sdk_path,
                    ..Default::default()
                };
                if let Some(dir) = android.android_dir {
                    settings.project_dir = dir;
                }
                android.common.apply(builder).android(settings).build()
            }
            Command::Ios(ios) => {
                let mut settings = IosSettings {
                    bundle_id: ios.bundle_id,
                    team_id: ios.team_id,
                    keychain_password: ios.keychain_password,
                    certificate_base64: ios.certificate_base64,
                    certificate_password: ios.certificate_password,
                    deployment_target: ios.deployment_target,
                    ..Default::default()
                };
                if let Some(dir) = ios.ios_dir {
                    settings.project_dir = dir;
                }
                ios.common.apply(builder).ios(settings).build()
            }
            Command::Windows(windows) => {
                let mut settings = WindowsSettings {
                    identity_name: windows.identity_name,
                    publisher: windows.publisher,
                    certificate_password: windows.certificate_password,
                    solution: windows.solution,
                    arch: windows.arch,
                    ..Default::default()
                };
                if let Some(dir) = windows.windows_dir {
                    settings.project_dir = dir;
                }
                windows.common.apply(builder).windows(settings).build()
            }
        }
    }
}

impl CommonArgs {
    fn apply(self, builder: PackagerConfigBuilder) -> PackagerConfigBuilder {
        builder
            .base_url(self.base_url)
            .run_number(self.run_number)
            .repository(self.repository)
            .pwa_manifest_path(self.pwa_manifest)
            .package_json_path(self.package_json)
            .manifest_only(self.manifest_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_windows_settings() {
        let args = Args::try_parse_from([
            "pwa_packager",
            "windows",
            "--base-url",
            "https://example.com/",
            "--run-number",
            "42",
            "--arch",
            "arm64",
            "--publisher",
            "Amora",
            "--manifest-only",
        ])
        .unwrap();
        assert_eq!(args.platform(), Platform::Windows);

        let config = args.into_config().unwrap();
        assert_eq!(config.run_number(), Some(42));
        assert!(config.manifest_only());
        assert_eq!(config.windows().arch, Arch::AArch64);
        assert_eq!(config.windows().publisher, "Amora");
        assert!(config.windows_dir().ends_with("windows"));
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let args = Args::try_parse_from([
            "pwa_packager",
            "android",
            "--base-url",
            "https://example.com/",
            "--output-dir",
            "out",
            "--android-dir",
            "twa",
        ])
        .unwrap();
        let config = args.into_config().unwrap();
        assert!(config.output_dir().ends_with("out"));
        assert!(config.android_dir().ends_with("twa"));
    }
}
