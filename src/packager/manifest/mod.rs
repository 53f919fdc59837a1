//! Platform manifest resolution.
//!
//! Merges the configured base URL, the PWA manifest and `package.json` into
//! one manifest per platform. Resolution is pure: every input is validated
//! before anything is written, so a failed resolution leaves the workspace
//! untouched.
//!
//! - [`twa`] - Bubblewrap `twa-manifest.json` (Android)
//! - [`ios`] - XcodeGen `project.yml` and `Config.xcconfig`
//! - [`windows`] - `Package.appxmanifest` and wrapper `config.json`
//! - [`version`] - version coercion shared by the platforms

pub mod ios;
pub mod twa;
pub mod version;
pub mod windows;

mod templates;

use crate::packager::{
    error::{ErrorExt, Result},
    settings::{PackageDescriptor, PackagerConfig, PwaManifest},
};
use std::path::Path;

/// Default theme and navigation color when the PWA manifest has none.
pub const DEFAULT_THEME_COLOR: &str = "#000000";

/// Default background color when the PWA manifest has none.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";

/// The parsed web app inputs shared by every platform.
#[derive(Clone, Debug)]
pub struct WebInputs {
    pub pwa: PwaManifest,
    pub package: PackageDescriptor,
}

impl WebInputs {
    /// Loads the PWA manifest and package descriptor named by `config`.
    pub async fn load(config: &PackagerConfig) -> Result<Self> {
        let pwa = PwaManifest::load(&config.pwa_manifest_path()).await?;
        let package = PackageDescriptor::load(&config.package_json_path()).await?;
        Ok(Self { pwa, package })
    }

    /// Human-readable application name.
    pub fn app_name(&self) -> &str {
        self.pwa
            .name
            .as_deref()
            .or(self.pwa.short_name.as_deref())
            .or(self.package.name.as_deref())
            .unwrap_or("App")
    }

    /// Short launcher name.
    pub fn short_name(&self) -> &str {
        self.pwa.short_name.as_deref().unwrap_or_else(|| self.app_name())
    }

    /// Theme color, defaulting to [`DEFAULT_THEME_COLOR`].
    pub fn theme_color(&self) -> &str {
        non_blank(self.pwa.theme_color.as_deref()).unwrap_or(DEFAULT_THEME_COLOR)
    }

    /// Background color, defaulting to [`DEFAULT_BACKGROUND_COLOR`].
    pub fn background_color(&self) -> &str {
        non_blank(self.pwa.background_color.as_deref()).unwrap_or(DEFAULT_BACKGROUND_COLOR)
    }

    /// Description from the manifest or the package.
    pub fn description(&self) -> &str {
        self.pwa
            .description
            .as_deref()
            .or(self.package.description.as_deref())
            .unwrap_or_else(|| self.app_name())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Character rules for a reverse-domain identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdentifierStyle {
    /// Java package name (Android): `[a-z0-9_]`, labels never start with a
    /// digit.
    JavaPackage,
    /// Apple bundle id and MSIX identity name: `[a-z0-9-]`, digits allowed
    /// anywhere.
    BundleId,
}

impl IdentifierStyle {
    fn sanitize(self, label: &str) -> String {
        let replacement = match self {
            IdentifierStyle::JavaPackage => '_',
            IdentifierStyle::BundleId => '-',
        };
        let mut label: String = label
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else if c == '-' && self == IdentifierStyle::BundleId {
                    c
                } else {
                    replacement
                }
            })
            .collect();
        if self == IdentifierStyle::JavaPackage && label.starts_with(|c: char| c.is_ascii_digit()) {
            label.insert(0, '_');
        }
        label
    }
}

/// Reverse-domain identifier derived from a host.
///
/// `app.example.com` + `twa` -> `com.example.app.twa`. Labels are lowercased
/// and `www` is dropped; other characters follow `style`:
///
/// - `my-app.9lives.io` as [`IdentifierStyle::JavaPackage`] -> `io._9lives.my_app`
/// - `my-app.9lives.io` as [`IdentifierStyle::BundleId`] -> `io.9lives.my-app`
pub fn reverse_domain(host: &str, suffix: &str, style: IdentifierStyle) -> String {
    host.split('.')
        .rev()
        .filter(|label| !label.is_empty() && *label != "www")
        .chain(std::iter::once(suffix))
        .map(|label| style.sanitize(label))
        .collect::<Vec<_>>()
        .join(".")
}

/// Writes generated text, creating parent directories.
pub(crate) async fn write_generated(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }
    tokio::fs::write(path, content)
        .await
        .fs_context("writing", path)?;
    log::info!("✓ Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_domain_builds_package_ids() {
        use IdentifierStyle::JavaPackage;
        assert_eq!(reverse_domain("example.com", "twa", JavaPackage), "com.example.twa");
        assert_eq!(reverse_domain("www.Example.com", "twa", JavaPackage), "com.example.twa");
        assert_eq!(
            reverse_domain("my-app.9lives.io", "twa", JavaPackage),
            "io._9lives.my_app.twa"
        );
    }

    #[test]
    fn reverse_domain_keeps_hyphens_in_bundle_ids() {
        use IdentifierStyle::BundleId;
        assert_eq!(reverse_domain("www.Example.com", "ios", BundleId), "com.example.ios");
        assert_eq!(
            reverse_domain("my-app.example.com", "ios", BundleId),
            "com.example.my-app.ios"
        );
        assert_eq!(
            reverse_domain("my_app.9lives.io", "pwa", BundleId),
            "io.9lives.my-app.pwa"
        );
    }

    #[test]
    fn blank_colors_use_defaults() {
        let inputs = WebInputs {
            pwa: serde_json::from_str(r##"{"theme_color":" ","background_color":"#101010"}"##)
                .unwrap(),
            package: PackageDescriptor::default(),
        };
        assert_eq!(inputs.theme_color(), DEFAULT_THEME_COLOR);
        assert_eq!(inputs.background_color(), "#101010");
        assert_eq!(inputs.app_name(), "App");
    }
}
