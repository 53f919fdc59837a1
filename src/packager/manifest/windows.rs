//! MSIX manifest and wrapper configuration for the Windows app.

use super::{
    IdentifierStyle, WebInputs, reverse_domain, templates::APPX_MANIFEST_TEMPLATE,
    version::windows_version, write_generated,
};
use crate::packager::{
    error::{Error, Result},
    settings::{Arch, PackagerConfig},
};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Package manifest file name inside the Windows project directory.
pub const APPX_MANIFEST_FILE: &str = "Package.appxmanifest";

/// Wrapper configuration file name.
pub const WRAPPER_CONFIG_FILE: &str = "config.json";

/// Length bounds of an MSIX `Identity/@Name`.
const IDENTITY_NAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;

/// Runtime configuration read by the Windows web view wrapper.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WrapperConfig {
    pub start_url: String,
    pub display_name: String,
    pub theme_color: String,
    pub background_color: String,
    pub version: String,
}

/// Resolved Windows package description.
#[derive(Clone, Debug, Serialize)]
pub struct WindowsConfig {
    pub identity_name: String,
    /// Publisher distinguished name, `CN=<publisher>`.
    pub publisher: String,
    pub publisher_display_name: String,
    pub display_name: String,
    pub description: String,
    /// Four-part package version.
    pub version: String,
    pub architecture: String,
    pub background_color: String,
    #[serde(skip)]
    pub arch: Arch,
    #[serde(skip)]
    pub wrapper: WrapperConfig,
}

impl WindowsConfig {
    /// Resolves the package description from configuration and web inputs.
    ///
    /// # Errors
    ///
    /// [`Error::MissingInput`] when the PWA manifest has no 512×512 icon or
    /// `package.json` has no version.
    pub fn resolve(config: &PackagerConfig, inputs: &WebInputs) -> Result<Self> {
        let base = config.base_url();
        let host = base
            .host_str()
            .ok_or_else(|| Error::MissingInput(format!("host in base URL {base}")))?;

        if inputs.pwa.launcher_icon().is_none() {
            return Err(Error::MissingInput(format!(
                "512x512 icon entry in {}",
                config.pwa_manifest_path().display()
            )));
        }

        let settings = config.windows();
        let version = windows_version(inputs.package.require_version()?, config.run_number());
        let start_url = base
            .join(inputs.pwa.start_url.as_deref().unwrap_or("/"))?
            .to_string();

        Ok(Self {
            identity_name: identity_name(settings.identity_name.as_deref(), host)?,
            publisher: format!("CN={}", settings.publisher),
            publisher_display_name: settings.publisher.clone(),
            display_name: inputs.app_name().to_string(),
            description: inputs.description().to_string(),
            version: version.clone(),
            architecture: settings.arch.appx_architecture().to_string(),
            background_color: inputs.background_color().to_string(),
            arch: settings.arch,
            wrapper: WrapperConfig {
                start_url,
                display_name: inputs.app_name().to_string(),
                theme_color: inputs.theme_color().to_string(),
                background_color: inputs.background_color().to_string(),
                version,
            },
        })
    }

    /// Renders `Package.appxmanifest`.
    pub fn render_appx_manifest(&self) -> Result<String> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(xml_escape);
        handlebars
            .register_template_string(APPX_MANIFEST_FILE, APPX_MANIFEST_TEMPLATE)
            .map_err(|e| {
                Error::GenericError(format!("failed to register AppX manifest template: {e}"))
            })?;
        handlebars
            .render(APPX_MANIFEST_FILE, self)
            .map_err(|e| Error::GenericError(format!("failed to render AppX manifest: {e}")))
    }

    /// Writes `Package.appxmanifest` and `config.json` into `windows_dir`.
    pub async fn write(&self, windows_dir: &Path) -> Result<Vec<PathBuf>> {
        let manifest = windows_dir.join(APPX_MANIFEST_FILE);
        write_generated(&manifest, &self.render_appx_manifest()?).await?;

        let wrapper = windows_dir.join(WRAPPER_CONFIG_FILE);
        write_generated(&wrapper, &serde_json::to_string_pretty(&self.wrapper)?).await?;

        Ok(vec![manifest, wrapper])
    }
}

/// The configured identity name, or one derived from `host`.
///
/// Derived names longer than the MSIX limit are cut at the limit; a configured
/// name must already be valid.
fn identity_name(configured: Option<&str>, host: &str) -> Result<String> {
    if let Some(name) = configured.map(str::trim).filter(|n| !n.is_empty()) {
        let valid_chars = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid_chars || !IDENTITY_NAME_LEN.contains(&name.len()) {
            return Err(Error::GenericError(format!(
                "Invalid WINDOWS_IDENTITY_NAME {name:?}: expected {} to {} letters, digits, '.' or '-'",
                IDENTITY_NAME_LEN.start(),
                IDENTITY_NAME_LEN.end()
            )));
        }
        return Ok(name.to_string());
    }

    let mut name = reverse_domain(host, "pwa", IdentifierStyle::BundleId);
    if name.len() > *IDENTITY_NAME_LEN.end() {
        name.truncate(*IDENTITY_NAME_LEN.end());
        let trimmed = name.trim_end_matches(['.', '-']).len();
        name.truncate(trimmed);
        log::warn!("Identity name derived from {host} is too long, using {name}");
    }
    Ok(name)
}

/// Escapes the five XML special characters.
fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::settings::{PackagerConfigBuilder, WindowsSettings};

    fn resolve(version: &str, run_number: Option<u64>) -> WindowsConfig {
        resolve_for("https://example.com/", version, run_number)
    }

    fn resolve_for(base_url: &str, version: &str, run_number: Option<u64>) -> WindowsConfig {
        let config = PackagerConfigBuilder::new()
            .base_url(Some(base_url.into()))
            .run_number(run_number)
            .windows(WindowsSettings {
                publisher: "Amora & Co".into(),
                arch: Arch::AArch64,
                ..Default::default()
            })
            .build()
            .unwrap();
        let inputs = WebInputs {
            pwa: serde_json::from_str(
                r#"{"name":"Amora","start_url":"/app","icons":[{"src":"/icon.png","sizes":"512x512"}]}"#,
            )
            .unwrap(),
            package: serde_json::from_str(&format!(r#"{{"version":"{version}"}}"#)).unwrap(),
        };
        WindowsConfig::resolve(&config, &inputs).unwrap()
    }

    #[test]
    fn version_gets_build_number_as_fourth_part() {
        assert_eq!(resolve("2.3.1", Some(42)).version, "2.3.1.42");
        assert_eq!(resolve("2.3", Some(42)).version, "1.0.0.42");
        assert_eq!(resolve("2.3.1", None).version, "2.3.1.0");
    }

    #[test]
    fn appx_manifest_carries_identity() {
        let xml = resolve("2.3.1", Some(42)).render_appx_manifest().unwrap();
        assert!(xml.contains(r#"Name="com.example.pwa""#));
        assert!(xml.contains(r#"Version="2.3.1.42""#));
        assert!(xml.contains(r#"ProcessorArchitecture="arm64""#));
        assert!(xml.contains(r#"Publisher="CN=Amora &amp; Co""#));
        assert!(xml.contains("<PublisherDisplayName>Amora &amp; Co</PublisherDisplayName>"));
        assert!(!xml.contains("&#x3D;"));
    }

    #[test]
    fn hyphenated_host_gives_a_valid_identity_name() {
        let config = resolve_for("https://my-app.example.com/", "2.3.1", Some(1));
        assert_eq!(config.identity_name, "com.example.my-app.pwa");
    }

    #[test]
    fn long_derived_identity_name_is_cut_to_fifty_characters() {
        let host = "a-very-long-subdomain-name.another-long-label.example.com";
        let name = identity_name(None, host).unwrap();
        assert!(name.len() <= 50, "{name}");
        assert!(name.starts_with("com.example.another-long-label."));
        assert!(!name.ends_with(['.', '-']));
    }

    #[test]
    fn configured_identity_name_is_validated() {
        assert_eq!(
            identity_name(Some("Amora.Dating"), "example.com").unwrap(),
            "Amora.Dating"
        );
        assert!(identity_name(Some("my_app"), "example.com").is_err());
        assert!(identity_name(Some("ab"), "example.com").is_err());
    }

    #[test]
    fn xml_escape_leaves_equals_signs_alone() {
        assert_eq!(xml_escape("CN=A<B>&\"C'"), "CN=A&lt;B&gt;&amp;&quot;C&apos;");
    }

    #[test]
    fn wrapper_config_points_at_start_url() {
        let config = resolve("2.3.1", Some(7));
        assert_eq!(config.wrapper.start_url, "https://example.com/app");
        assert_eq!(config.wrapper.theme_color, "#000000");
        assert_eq!(config.wrapper.version, "2.3.1.7");
    }
}
