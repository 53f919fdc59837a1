//! Android Trusted Web Activity via Bubblewrap.

use super::{Platform, PlatformBuilder};
use crate::packager::{
    builder::tool_detection::require_tools,
    credentials::android::{AndroidKeystore, provision_keystore},
    error::{Context, Error, ErrorExt, Result},
    manifest::{WebInputs, twa::{TWA_MANIFEST_FILE, TwaManifest}},
    settings::{AndroidSettings, PackagerConfig},
    utils::{fs::copy_file, process::ToolCommand},
};
use std::path::{Path, PathBuf};

/// Signed APK produced by `bubblewrap build`.
pub const SIGNED_APK: &str = "app-release-signed.apk";

/// App bundle produced by `bubblewrap build`.
pub const RELEASE_BUNDLE: &str = "app-release-bundle.aab";

/// Bubblewrap's global configuration, relative to the home directory.
pub const BUBBLEWRAP_CONFIG: &str = ".bubblewrap/config.json";

/// A TWA project ready for Bubblewrap.
#[derive(Debug)]
pub struct AndroidStaged {
    pub manifest: TwaManifest,
    pub keystore: AndroidKeystore,
}

/// Builds the Android APK and App Bundle.
#[derive(Debug)]
pub struct AndroidBuilder<'a> {
    config: &'a PackagerConfig,
}

impl<'a> AndroidBuilder<'a> {
    pub fn new(config: &'a PackagerConfig) -> Self {
        Self { config }
    }

    fn bubblewrap(&self, staged: &AndroidStaged) -> ToolCommand {
        let password = staged.keystore.password.value();
        ToolCommand::new("bubblewrap")
            .current_dir(self.config.android_dir())
            .env("BUBBLEWRAP_KEYSTORE_PASSWORD", password)
            .env("BUBBLEWRAP_KEY_PASSWORD", password)
            // Keystore password, then key password.
            .stdin_script(format!("{password}\n{password}\n"))
    }
}

impl PlatformBuilder for AndroidBuilder<'_> {
    type Resolved = TwaManifest;
    type Staged = AndroidStaged;

    fn platform(&self) -> Platform {
        Platform::Android
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["bubblewrap", "keytool"]
    }

    async fn validate_inputs(&self) -> Result<TwaManifest> {
        let inputs = WebInputs::load(self.config).await?;
        let manifest = TwaManifest::resolve(self.config, &inputs)?;
        if !self.config.manifest_only() {
            require_tools(self.required_tools())?;
        }
        Ok(manifest)
    }

    async fn write_manifest(&self, manifest: &TwaManifest) -> Result<Vec<PathBuf>> {
        Ok(vec![manifest.write(&self.config.android_dir()).await?])
    }

    async fn stage(&self, manifest: TwaManifest) -> Result<AndroidStaged> {
        let keystore = provision_keystore(self.config, &manifest.host).await?;

        match dirs::home_dir() {
            Some(home) => write_bubblewrap_config(self.config.android(), &home).await?,
            None => log::warn!("No home directory, leaving Bubblewrap configuration untouched"),
        }

        Ok(AndroidStaged { manifest, keystore })
    }

    async fn invoke(&self, staged: &AndroidStaged) -> Result<()> {
        log::info!("Updating Bubblewrap project for {}", staged.manifest.package_id);
        self.bubblewrap(staged)
            .arg("update")
            .arg("--skipVersionUpgrade")
            .arg(format!("--manifest={TWA_MANIFEST_FILE}"))
            .run()
            .await
            .context("updating Bubblewrap project")?;

        log::info!("Building signed APK and App Bundle");
        self.bubblewrap(staged)
            .arg("build")
            .arg("--skipPwaValidation")
            .run()
            .await
            .context("building Android app")?;
        Ok(())
    }

    async fn package(&self, _staged: &AndroidStaged) -> Result<Vec<PathBuf>> {
        let android_dir = self.config.android_dir();
        let output_dir = self.config.output_dir();

        let apk = android_dir.join(SIGNED_APK);
        if !apk.is_file() {
            return Err(Error::MissingInput(format!(
                "{} (expected bubblewrap build output)",
                apk.display()
            )));
        }
        let mut artifacts = vec![copy_artifact(&apk, &output_dir).await?];

        let bundle = android_dir.join(RELEASE_BUNDLE);
        if bundle.is_file() {
            artifacts.push(copy_artifact(&bundle, &output_dir).await?);
        } else {
            log::warn!("No {RELEASE_BUNDLE} produced, skipping App Bundle");
        }

        Ok(artifacts)
    }
}

async fn copy_artifact(path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .with_context(|| format!("no file name in {}", path.display()))?;
    let dest = output_dir.join(file_name);
    copy_file(path, &dest).await?;
    log::info!("✓ Copied {}", dest.display());
    Ok(dest)
}

/// Points Bubblewrap at the configured JDK and Android SDK.
///
/// Keys already present in the config file are kept unless overridden.
/// Nothing is written when neither path is configured.
pub async fn write_bubblewrap_config(settings: &AndroidSettings, home: &Path) -> Result<()> {
    if settings.jdk_path.is_none() && settings.sdk_path.is_none() {
        log::debug!("No JDK or Android SDK configured, leaving Bubblewrap configuration untouched");
        return Ok(());
    }

    let path = home.join(BUBBLEWRAP_CONFIG);
    let mut config = match tokio::fs::read_to_string(&path).await {
        Ok(content) => match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => {
                log::warn!("Replacing unreadable Bubblewrap config {}", path.display());
                serde_json::Map::new()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => serde_json::Map::new(),
        Err(e) => return Err(e).fs_context("reading Bubblewrap config", &path),
    };

    if let Some(jdk) = &settings.jdk_path {
        config.insert("jdkPath".into(), jdk.to_string_lossy().into_owned().into());
    }
    if let Some(sdk) = &settings.sdk_path {
        config.insert("androidSdkPath".into(), sdk.to_string_lossy().into_owned().into());
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }
    tokio::fs::write(&path, serde_json::to_string_pretty(&config)?)
        .await
        .fs_context("writing Bubblewrap config", &path)?;
    log::info!("✓ Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::settings::PackagerConfigBuilder;

    fn settings(jdk: Option<&str>, sdk: Option<&str>) -> AndroidSettings {
        AndroidSettings {
            jdk_path: jdk.map(PathBuf::from),
            sdk_path: sdk.map(PathBuf::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn bubblewrap_config_merges_existing_keys() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join(BUBBLEWRAP_CONFIG);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"jdkPath":"/old/jdk","androidSdkPath":"/old/sdk"}"#).unwrap();

        write_bubblewrap_config(&settings(Some("/opt/jdk17"), None), home.path())
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["jdkPath"], "/opt/jdk17");
        assert_eq!(written["androidSdkPath"], "/old/sdk");
    }

    #[tokio::test]
    async fn bubblewrap_config_untouched_without_paths() {
        let home = tempfile::tempdir().unwrap();
        write_bubblewrap_config(&settings(None, None), home.path())
            .await
            .unwrap();
        assert!(!home.path().join(BUBBLEWRAP_CONFIG).exists());
    }

    #[tokio::test]
    async fn package_requires_signed_apk_and_tolerates_missing_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let config = PackagerConfigBuilder::new()
            .project_dir(dir.path())
            .base_url(Some("https://example.com/".into()))
            .build()
            .unwrap();
        let builder = AndroidBuilder::new(&config);
        let staged = AndroidStaged {
            manifest: test_manifest(&config),
            keystore: AndroidKeystore {
                path: dir.path().join("android/android.keystore"),
                alias: "android".into(),
                password: crate::packager::credentials::SecretResolver::new(
                    "test password",
                    dir.path().join(".pw"),
                    "app",
                )
                .with_override(Some("pw".into()))
                .resolve()
                .await
                .unwrap(),
            },
        };

        let err = builder.package(&staged).await.unwrap_err();
        assert!(err.is_missing_input());

        std::fs::create_dir_all(dir.path().join("android")).unwrap();
        std::fs::write(dir.path().join("android").join(SIGNED_APK), b"apk").unwrap();
        let artifacts = builder.package(&staged).await.unwrap();
        assert_eq!(artifacts, vec![dir.path().join("dist").join(SIGNED_APK)]);
    }

    fn test_manifest(config: &PackagerConfig) -> TwaManifest {
        let inputs = WebInputs {
            pwa: serde_json::from_str(r#"{"name":"Amora","icons":[{"src":"/icon.png","sizes":"512x512"}]}"#)
                .unwrap(),
            package: serde_json::from_str(r#"{"version":"1.0.0"}"#).unwrap(),
        };
        TwaManifest::resolve(config, &inputs).unwrap()
    }
}
