//! XcodeGen project generation for the iOS wrapper app.

use super::{
    IdentifierStyle, WebInputs, reverse_domain,
    templates::{PROJECT_YML_TEMPLATE, XCCONFIG_TEMPLATE},
    version::marketing_version,
    write_generated,
};
use crate::packager::{
    error::{Error, Result},
    settings::PackagerConfig,
};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// XcodeGen spec file name.
pub const PROJECT_YML_FILE: &str = "project.yml";

/// Shared build settings file name.
pub const XCCONFIG_FILE: &str = "Config.xcconfig";

/// Resolved iOS project description.
#[derive(Clone, Debug, Serialize)]
pub struct IosProject {
    /// Xcode target and scheme name (identifier-safe).
    pub target_name: String,
    pub display_name: String,
    pub bundle_id: String,
    pub marketing_version: String,
    pub build_version: u64,
    pub start_url: String,
    pub theme_color: String,
    pub deployment_target: String,
    pub team_id: Option<String>,
}

impl IosProject {
    /// Resolves the project from configuration and web inputs.
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

        let version = inputs.package.require_version()?;
        let start_url = base
            .join(inputs.pwa.start_url.as_deref().unwrap_or("/"))?
            .to_string();

        Ok(Self {
            target_name: target_name(inputs.short_name()),
            display_name: inputs.short_name().to_string(),
            bundle_id: config
                .ios()
                .bundle_id
                .clone()
                .unwrap_or_else(|| reverse_domain(host, "ios", IdentifierStyle::BundleId)),
            marketing_version: marketing_version(version),
            build_version: config.run_number().unwrap_or(1),
            start_url,
            theme_color: inputs.theme_color().to_string(),
            deployment_target: config.ios().deployment_target.clone(),
            team_id: config.ios().team_id.clone(),
        })
    }

    /// Bundle id without its last segment, used as XcodeGen's prefix.
    pub fn bundle_id_prefix(&self) -> &str {
        self.bundle_id
            .rsplit_once('.')
            .map(|(prefix, _)| prefix)
            .unwrap_or(&self.bundle_id)
    }

    /// Renders `project.yml`.
    pub fn render_project_yml(&self) -> Result<String> {
        let data = serde_json::json!({
            "target_name": self.target_name,
            "bundle_id_prefix": self.bundle_id_prefix(),
            "bundle_id": self.bundle_id,
            "deployment_target": self.deployment_target,
            "display_name": yaml_quote(&self.display_name),
        });
        render(PROJECT_YML_FILE, PROJECT_YML_TEMPLATE, &data)
    }

    /// Renders `Config.xcconfig`.
    pub fn render_xcconfig(&self) -> Result<String> {
        let data = serde_json::json!({
            "marketing_version": self.marketing_version,
            "build_version": self.build_version,
            "start_url": xcconfig_escape(&self.start_url),
            "theme_color": self.theme_color,
            "team_id": self.team_id,
        });
        render(XCCONFIG_FILE, XCCONFIG_TEMPLATE, &data)
    }

    /// Writes `project.yml` and `Config.xcconfig` into `ios_dir`.
    pub async fn write(&self, ios_dir: &Path) -> Result<Vec<PathBuf>> {
        let project_yml = ios_dir.join(PROJECT_YML_FILE);
        write_generated(&project_yml, &self.render_project_yml()?).await?;

        let xcconfig = ios_dir.join(XCCONFIG_FILE);
        write_generated(&xcconfig, &self.render_xcconfig()?).await?;

        Ok(vec![project_yml, xcconfig])
    }
}

fn render(name: &str, template: &str, data: &serde_json::Value) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string(name, template)
        .map_err(|e| Error::GenericError(format!("failed to register {name} template: {e}")))?;
    handlebars
        .render(name, data)
        .map_err(|e| Error::GenericError(format!("failed to render {name}: {e}")))
}

/// Identifier-safe target name: alphanumeric words joined in PascalCase.
fn target_name(name: &str) -> String {
    let mut target: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default()
        })
        .collect();
    if target.is_empty() || target.starts_with(|c: char| c.is_ascii_digit()) {
        target.insert_str(0, "App");
    }
    target
}

/// Double-quoted YAML scalar.
fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// xcconfig treats `//` as a comment start; `$()` expands to nothing.
fn xcconfig_escape(value: &str) -> String {
    value.replace("//", "/$()/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::settings::{IosSettings, PackagerConfigBuilder};

    fn project(team_id: Option<&str>) -> IosProject {
        project_for("https://example.com/", team_id)
    }

    fn project_for(base_url: &str, team_id: Option<&str>) -> IosProject {
        let config = PackagerConfigBuilder::new()
            .base_url(Some(base_url.into()))
            .run_number(Some(42))
            .ios(IosSettings {
                team_id: team_id.map(String::from),
                ..Default::default()
            })
            .build()
            .unwrap();
        let inputs = WebInputs {
            pwa: serde_json::from_str(
                r#"{"name":"Amora Dating","short_name":"Amora \"Beta\"",
                    "icons":[{"src":"/icon.png","sizes":"512x512"}]}"#,
            )
            .unwrap(),
            package: serde_json::from_str(r#"{"version":"2.3.1-rc.1"}"#).unwrap(),
        };
        IosProject::resolve(&config, &inputs).unwrap()
    }

    #[test]
    fn resolves_identity_and_versions() {
        let project = project(None);
        assert_eq!(project.target_name, "AmoraBeta");
        assert_eq!(project.bundle_id, "com.example.ios");
        assert_eq!(project.bundle_id_prefix(), "com.example");
        assert_eq!(project.marketing_version, "2.3.1");
        assert_eq!(project.build_version, 42);
        assert_eq!(project.start_url, "https://example.com/");
    }

    #[test]
    fn hyphenated_host_keeps_hyphen_in_bundle_id() {
        let project = project_for("https://my-app.example.com/", None);
        assert_eq!(project.bundle_id, "com.example.my-app.ios");
        assert_eq!(project.bundle_id_prefix(), "com.example.my-app");
    }

    #[test]
    fn xcconfig_keeps_urls_intact() {
        let xcconfig = project(Some("ABCDE12345")).render_xcconfig().unwrap();
        assert!(xcconfig.contains("PWA_START_URL = https:/$()/example.com/\n"));
        assert!(xcconfig.contains("MARKETING_VERSION = 2.3.1\n"));
        assert!(xcconfig.contains("CURRENT_PROJECT_VERSION = 42\n"));
        assert!(xcconfig.contains("DEVELOPMENT_TEAM = ABCDE12345"));

        let unsigned = project(None).render_xcconfig().unwrap();
        assert!(!unsigned.contains("DEVELOPMENT_TEAM"));
    }

    #[test]
    fn project_yml_quotes_display_name() {
        let yml = project(None).render_project_yml().unwrap();
        assert!(yml.starts_with("name: AmoraBeta\n"));
        assert!(yml.contains(r#"CFBundleDisplayName: "Amora \"Beta\"""#));
        assert!(yml.contains("PRODUCT_BUNDLE_IDENTIFIER: com.example.ios"));
    }

    #[test]
    fn target_name_is_identifier_safe() {
        assert_eq!(target_name("my dating-app"), "MyDatingApp");
        assert_eq!(target_name("24/7 chat"), "App247Chat");
        assert_eq!(target_name("!!!"), "App");
    }
}
