//! Bubblewrap `twa-manifest.json` generation.

use super::{IdentifierStyle, WebInputs, reverse_domain, write_generated};
use crate::packager::{
    error::{Error, Result},
    settings::PackagerConfig,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

/// File name Bubblewrap reads the project description from.
pub const TWA_MANIFEST_FILE: &str = "twa-manifest.json";

/// Keystore file name inside the Android project directory.
pub const KEYSTORE_FILE: &str = "android.keystore";

/// Alias of the signing key inside the keystore.
pub const KEY_ALIAS: &str = "android";

const MIN_SDK_VERSION: u32 = 21;
const SPLASH_FADE_OUT_MS: u32 = 300;

/// Signing key reference inside the TWA manifest.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SigningKey {
    pub path: String,
    pub alias: String,
}

/// Feature toggles Bubblewrap expects as an object.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AlphaDependencies {
    pub enabled: bool,
}

/// A Trusted Web Activity project description in Bubblewrap's schema.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwaManifest {
    /// Android application id.
    pub package_id: String,
    /// Origin host the activity is verified against.
    pub host: String,
    pub name: String,
    /// Name under the launcher icon.
    pub launcher_name: String,
    /// `standalone` or `fullscreen`.
    pub display: String,
    pub orientation: String,
    /// Status bar color; all theme and navigation colors share it.
    pub theme_color: String,
    pub theme_color_dark: String,
    pub navigation_color: String,
    pub navigation_color_dark: String,
    pub navigation_divider_color: String,
    pub navigation_divider_color_dark: String,
    /// Splash screen color.
    pub background_color: String,
    pub enable_notifications: bool,
    /// Start path, relative to the host.
    pub start_url: String,
    /// Absolute URL of the 512×512 launcher icon.
    pub icon_url: String,
    /// Absolute URL of the first maskable icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maskable_icon_url: Option<String>,
    /// Splash fade-out in milliseconds.
    pub splash_screen_fade_out_duration: u32,
    /// Keystore Bubblewrap signs with, relative to the Android project.
    pub signing_key: SigningKey,
    /// Version from `package.json`.
    pub app_version: String,
    /// Same as `app_version`.
    pub app_version_name: String,
    /// CI run number, 1 when absent.
    pub app_version_code: u64,
    pub shortcuts: Vec<serde_json::Value>,
    /// Name of the tool that wrote the file.
    pub generator_app: String,
    /// Absolute URL of the web manifest.
    pub web_manifest_url: String,
    /// Launch mode when Trusted Web Activities are unavailable.
    pub fallback_type: String,
    pub features: serde_json::Map<String, serde_json::Value>,
    pub alpha_dependencies: AlphaDependencies,
    pub enable_site_settings_shortcut: bool,
    #[serde(rename = "isChromeOSOnly")]
    pub is_chrome_os_only: bool,
    pub is_meta_quest: bool,
    /// Origin root, the scope of the activity.
    pub full_scope_url: String,
    pub min_sdk_version: u32,
    /// Digital asset link fingerprints; filled in by Bubblewrap.
    pub fingerprints: Vec<serde_json::Value>,
    pub additional_trusted_origins: Vec<String>,
    pub retained_bundles: Vec<u64>,
}

impl TwaManifest {
    /// Resolves the manifest from configuration and web inputs.
    ///
    /// # Errors
    ///
    /// [`Error::MissingInput`] when the PWA manifest has no 512×512 icon or
    /// `package.json` has no version.
    pub fn resolve(config: &PackagerConfig, inputs: &WebInputs) -> Result<Self> {
        let base = config.base_url();
        let host = base
            .host_str()
            .ok_or_else(|| Error::MissingInput(format!("host in base URL {base}")))?
            .to_string();

        let icon = inputs.pwa.launcher_icon().ok_or_else(|| {
            Error::MissingInput(format!(
                "512x512 icon entry in {}",
                config.pwa_manifest_path().display()
            ))
        })?;
        let icon_url = base.join(&icon.src)?.to_string();
        let maskable_icon_url = inputs
            .pwa
            .maskable_icon()
            .map(|icon| base.join(&icon.src).map(String::from))
            .transpose()?;

        let version = inputs.package.require_version()?.to_string();
        let theme = inputs.theme_color().to_string();

        let package_id = config
            .android()
            .package_id
            .clone()
            .unwrap_or_else(|| reverse_domain(&host, "twa", IdentifierStyle::JavaPackage));

        let web_manifest_name = config
            .pwa_manifest_path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "manifest.json".to_string());

        Ok(Self {
            package_id,
            host,
            name: inputs.app_name().to_string(),
            launcher_name: inputs.short_name().to_string(),
            display: bubblewrap_display(inputs.pwa.display.as_deref()).to_string(),
            orientation: inputs
                .pwa
                .orientation
                .clone()
                .unwrap_or_else(|| "default".to_string()),
            theme_color: theme.clone(),
            theme_color_dark: theme.clone(),
            navigation_color: theme.clone(),
            navigation_color_dark: theme.clone(),
            navigation_divider_color: theme.clone(),
            navigation_divider_color_dark: theme,
            background_color: inputs.background_color().to_string(),
            enable_notifications: true,
            start_url: start_path(base, inputs.pwa.start_url.as_deref())?,
            icon_url,
            maskable_icon_url,
            splash_screen_fade_out_duration: SPLASH_FADE_OUT_MS,
            signing_key: SigningKey {
                path: format!("./{KEYSTORE_FILE}"),
                alias: KEY_ALIAS.to_string(),
            },
            app_version: version.clone(),
            app_version_name: version,
            app_version_code: config.run_number().unwrap_or(1),
            shortcuts: Vec::new(),
            generator_app: env!("CARGO_PKG_NAME").to_string(),
            web_manifest_url: base.join(&web_manifest_name)?.to_string(),
            fallback_type: "customtabs".to_string(),
            features: serde_json::Map::new(),
            alpha_dependencies: AlphaDependencies::default(),
            enable_site_settings_shortcut: true,
            is_chrome_os_only: false,
            is_meta_quest: false,
            full_scope_url: base.join("/")?.to_string(),
            min_sdk_version: MIN_SDK_VERSION,
            fingerprints: Vec::new(),
            additional_trusted_origins: Vec::new(),
            retained_bundles: Vec::new(),
        })
    }

    /// Writes `twa-manifest.json` into `android_dir`.
    pub async fn write(&self, android_dir: &Path) -> Result<PathBuf> {
        let path = android_dir.join(TWA_MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        write_generated(&path, &json).await?;
        Ok(path)
    }
}

/// Maps a web display mode onto the modes Bubblewrap supports.
fn bubblewrap_display(display: Option<&str>) -> &'static str {
    match display {
        Some("fullscreen") => "fullscreen",
        _ => "standalone",
    }
}

/// Start URL as a path (plus query) on the base URL's host.
fn start_path(base: &Url, start_url: Option<&str>) -> Result<String> {
    let resolved = base.join(start_url.unwrap_or("/"))?;
    let mut path = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        path.push('?');
        path.push_str(query);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::settings::{AndroidSettings, PackagerConfigBuilder};

    fn config(run_number: Option<u64>) -> PackagerConfig {
        PackagerConfigBuilder::new()
            .project_dir("/work")
            .base_url(Some("https://example.com/".into()))
            .run_number(run_number)
            .build()
            .unwrap()
    }

    fn inputs(pwa: &str, version: &str) -> WebInputs {
        WebInputs {
            pwa: serde_json::from_str(pwa).unwrap(),
            package: serde_json::from_str(&format!(r#"{{"name":"dating-web-app","version":"{version}"}}"#))
                .unwrap(),
        }
    }

    #[test]
    fn resolves_host_icon_and_versions() {
        let twa = TwaManifest::resolve(
            &config(Some(42)),
            &inputs(
                r#"{"name":"Amora","icons":[{"src":"/icon.png","sizes":"512x512"}]}"#,
                "2.3.1",
            ),
        )
        .unwrap();

        assert_eq!(twa.host, "example.com");
        assert_eq!(twa.icon_url, "https://example.com/icon.png");
        assert_eq!(twa.app_version_code, 42);
        assert_eq!(twa.app_version, "2.3.1");
        assert_eq!(twa.app_version_name, "2.3.1");
        assert_eq!(twa.package_id, "com.example.twa");
        assert_eq!(twa.start_url, "/");
        assert_eq!(twa.web_manifest_url, "https://example.com/manifest.json");
        assert_eq!(twa.launcher_name, "Amora");
        assert!(twa.maskable_icon_url.is_none());
    }

    #[test]
    fn omitted_theme_color_defaults_to_black() {
        let twa = TwaManifest::resolve(
            &config(None),
            &inputs(r#"{"icons":[{"src":"icon.png","sizes":"512x512"}]}"#, "1.0.0"),
        )
        .unwrap();

        for color in [
            &twa.theme_color,
            &twa.navigation_color,
            &twa.navigation_color_dark,
            &twa.navigation_divider_color,
        ] {
            assert_eq!(color, "#000000");
        }
        assert_eq!(twa.app_version_code, 1);
    }

    #[test]
    fn missing_512_icon_is_a_missing_input() {
        let err = TwaManifest::resolve(
            &config(Some(1)),
            &inputs(r#"{"icons":[{"src":"/icon-192.png","sizes":"192x192"}]}"#, "1.0.0"),
        )
        .unwrap_err();
        assert!(err.is_missing_input());
        assert!(err.to_string().contains("512x512"));
    }

    #[test]
    fn start_url_and_maskable_icon_resolve_against_base() {
        let twa = TwaManifest::resolve(
            &config(Some(3)),
            &inputs(
                r##"{"start_url":"./app?source=twa","theme_color":"#e91e63","display":"minimal-ui",
                    "icons":[{"src":"/icon.png","sizes":"512x512"},
                             {"src":"/maskable.png","sizes":"512x512","purpose":"maskable"}]}"##,
                "1.4.0",
            ),
        )
        .unwrap();

        assert_eq!(twa.start_url, "/app?source=twa");
        assert_eq!(twa.theme_color, "#e91e63");
        assert_eq!(twa.display, "standalone");
        assert_eq!(
            twa.maskable_icon_url.as_deref(),
            Some("https://example.com/maskable.png")
        );
    }

    #[test]
    fn configured_package_id_wins() {
        let config = PackagerConfigBuilder::new()
            .base_url(Some("https://example.com/".into()))
            .android(AndroidSettings {
                package_id: Some("app.amora.mobile".into()),
                ..Default::default()
            })
            .build()
            .unwrap();
        let twa = TwaManifest::resolve(
            &config,
            &inputs(r#"{"icons":[{"src":"/icon.png","sizes":"512x512"}]}"#, "1.0.0"),
        )
        .unwrap();
        assert_eq!(twa.package_id, "app.amora.mobile");
    }

    #[test]
    fn serializes_in_bubblewrap_field_names() {
        let twa = TwaManifest::resolve(
            &config(Some(42)),
            &inputs(r#"{"icons":[{"src":"/icon.png","sizes":"512x512"}]}"#, "2.3.1"),
        )
        .unwrap();
        let json = serde_json::to_value(&twa).unwrap();

        assert_eq!(json["appVersionCode"], 42);
        assert_eq!(json["iconUrl"], "https://example.com/icon.png");
        assert_eq!(json["signingKey"]["alias"], "android");
        assert_eq!(json["isChromeOSOnly"], false);
        assert!(json.get("maskableIconUrl").is_none());
    }
}
