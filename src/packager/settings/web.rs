//! Web app inputs: the PWA manifest and `package.json`.

use crate::packager::error::{Error, ErrorExt, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Icon entry of a PWA manifest.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PwaIcon {
    /// Icon URL, relative to the manifest's origin.
    pub src: String,

    /// Space-separated `WxH` list, e.g. `"192x192 512x512"`.
    #[serde(default)]
    pub sizes: Option<String>,

    /// MIME type.
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,

    /// Space-separated purposes (`any`, `maskable`, `monochrome`).
    #[serde(default)]
    pub purpose: Option<String>,
}

impl PwaIcon {
    /// Whether `sizes` lists `width`x`height`.
    pub fn has_size(&self, width: u32, height: u32) -> bool {
        let wanted = format!("{width}x{height}");
        self.sizes
            .as_deref()
            .is_some_and(|sizes| sizes.split_whitespace().any(|s| s.eq_ignore_ascii_case(&wanted)))
    }

    /// Whether the icon is declared maskable.
    pub fn is_maskable(&self) -> bool {
        self.purposes().any(|p| p.eq_ignore_ascii_case("maskable"))
    }

    /// Whether the icon may be used as a regular launcher icon.
    pub fn is_any_purpose(&self) -> bool {
        self.purpose.is_none() || self.purposes().any(|p| p.eq_ignore_ascii_case("any"))
    }

    fn purposes(&self) -> impl Iterator<Item = &str> {
        self.purpose.as_deref().unwrap_or("").split_whitespace()
    }
}

/// The subset of the web app manifest used for packaging.
///
/// Unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PwaManifest {
    /// Full application name.
    #[serde(default)]
    pub name: Option<String>,

    /// Launcher name, used where space is short.
    #[serde(default)]
    pub short_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Start URL, resolved against the base URL.
    #[serde(default)]
    pub start_url: Option<String>,

    /// Display mode (`standalone`, `fullscreen`, ...).
    #[serde(default)]
    pub display: Option<String>,

    /// Screen orientation lock.
    #[serde(default)]
    pub orientation: Option<String>,

    /// Toolbar and status bar color.
    #[serde(default)]
    pub theme_color: Option<String>,

    /// Splash screen color.
    #[serde(default)]
    pub background_color: Option<String>,

    /// Declared icons; one must be 512×512.
    #[serde(default)]
    pub icons: Vec<PwaIcon>,
}

impl PwaManifest {
    /// Reads and parses a manifest file.
    pub async fn load(path: &Path) -> Result<Self> {
        load_json(path, "PWA manifest").await
    }

    /// The 512×512 launcher icon, preferring non-maskable entries.
    pub fn launcher_icon(&self) -> Option<&PwaIcon> {
        let mut sized = self.icons.iter().filter(|icon| icon.has_size(512, 512));
        let first = sized.clone().next();
        sized.find(|icon| icon.is_any_purpose()).or(first)
    }

    /// The first maskable icon, if any.
    pub fn maskable_icon(&self) -> Option<&PwaIcon> {
        self.icons.iter().find(|icon| icon.is_maskable())
    }
}

/// The subset of `package.json` used for packaging.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PackageDescriptor {
    /// Package name, the last fallback for the app name.
    #[serde(default)]
    pub name: Option<String>,

    /// Release version; required for every platform.
    #[serde(default)]
    pub version: Option<String>,

    /// Used when the PWA manifest has no description.
    #[serde(default)]
    pub description: Option<String>,
}

impl PackageDescriptor {
    /// Reads and parses a package descriptor.
    pub async fn load(path: &Path) -> Result<Self> {
        load_json(path, "package descriptor").await
    }

    /// The package version.
    ///
    /// # Errors
    ///
    /// [`Error::MissingInput`] when the descriptor has no `version`.
    pub fn require_version(&self) -> Result<&str> {
        self.version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::MissingInput("`version` field in package.json".into()))
    }
}

async fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    if !path.is_file() {
        return Err(Error::MissingInput(format!("{what} at {}", path.display())));
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .fs_context("reading", path)?;
    serde_json::from_str(&content).map_err(|error| Error::InvalidJson {
        path: path.to_path_buf(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> PwaManifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn launcher_icon_prefers_any_purpose() {
        let m = manifest(
            r#"{"icons":[
                {"src":"/mask.png","sizes":"512x512","purpose":"maskable"},
                {"src":"/icon.png","sizes":"192x192 512x512"}
            ]}"#,
        );
        assert_eq!(m.launcher_icon().unwrap().src, "/icon.png");
        assert_eq!(m.maskable_icon().unwrap().src, "/mask.png");
    }

    #[test]
    fn launcher_icon_falls_back_to_maskable_512() {
        let m = manifest(r#"{"icons":[{"src":"/mask.png","sizes":"512x512","purpose":"maskable"}]}"#);
        assert_eq!(m.launcher_icon().unwrap().src, "/mask.png");
    }

    #[test]
    fn manifest_without_512_icon_has_no_launcher_icon() {
        let m = manifest(r#"{"name":"Amora","icons":[{"src":"/icon.png","sizes":"192x192"}]}"#);
        assert!(m.launcher_icon().is_none());
        assert!(manifest("{}").launcher_icon().is_none());
    }

    #[tokio::test]
    async fn missing_file_is_a_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = PwaManifest::load(&dir.path().join("manifest.json"))
            .await
            .unwrap_err();
        assert!(err.is_missing_input());
    }

    #[tokio::test]
    async fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = PackageDescriptor::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::InvalidJson { .. }));
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn blank_version_is_missing() {
        let pkg: PackageDescriptor = serde_json::from_str(r#"{"version":" "}"#).unwrap();
        assert!(pkg.require_version().unwrap_err().is_missing_input());
    }
}
