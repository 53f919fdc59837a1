//! Android upload keystore provisioning.

use super::{ResolvedSecret, SecretResolver};
use crate::packager::{
    error::{Context, ErrorExt, Result},
    manifest::twa::{KEY_ALIAS, KEYSTORE_FILE},
    settings::PackagerConfig,
    utils::process::ToolCommand,
};
use std::path::PathBuf;

/// Keystore password cache file inside the Android project directory.
pub const KEYSTORE_PASSWORD_CACHE: &str = ".keystore-password";

/// A keystore ready for Bubblewrap to sign with.
#[derive(Debug, Clone)]
pub struct AndroidKeystore {
    pub path: PathBuf,
    pub alias: String,
    /// Used for both the store and the key.
    pub password: ResolvedSecret,
}

/// Resolves the keystore password and creates the keystore if absent.
///
/// An existing keystore is reused untouched; only its password has to
/// resolve to the value it was created with, which the password cache
/// guarantees across runs.
pub async fn provision_keystore(config: &PackagerConfig, host: &str) -> Result<AndroidKeystore> {
    let android_dir = config.android_dir();
    let password = SecretResolver::new(
        "keystore password",
        android_dir.join(KEYSTORE_PASSWORD_CACHE),
        config.repository_name(),
    )
    .with_override(config.android().keystore_password.clone())
    .resolve()
    .await?;

    let keystore = AndroidKeystore {
        path: android_dir.join(KEYSTORE_FILE),
        alias: KEY_ALIAS.to_string(),
        password,
    };

    if keystore.path.is_file() {
        log::info!("Reusing keystore {}", keystore.path.display());
        return Ok(keystore);
    }

    log::info!("Generating keystore {}", keystore.path.display());
    tokio::fs::create_dir_all(&android_dir)
        .await
        .fs_context("creating directory", &android_dir)?;
    keytool_genkeypair(&keystore, host, config.repository_name())
        .run()
        .await
        .context("generating Android keystore")?;
    log::info!("✓ Created keystore {}", keystore.path.display());

    Ok(keystore)
}

fn keytool_genkeypair(keystore: &AndroidKeystore, host: &str, organization: &str) -> ToolCommand {
    ToolCommand::new("keytool")
        .args(["-genkeypair", "-v", "-keystore"])
        .arg(&keystore.path)
        .args(["-alias", keystore.alias.as_str()])
        .args(["-keyalg", "RSA", "-keysize", "2048", "-validity", "10000"])
        .arg("-storepass")
        .secret_arg(keystore.password.value())
        .arg("-keypass")
        .secret_arg(keystore.password.value())
        .arg("-dname")
        .arg(format!("CN={host}, OU={organization}, O={organization}, C=US"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::settings::{AndroidSettings, PackagerConfigBuilder};

    fn config(dir: &std::path::Path) -> PackagerConfig {
        PackagerConfigBuilder::new()
            .project_dir(dir)
            .base_url(Some("https://example.com/".into()))
            .repository(Some("acme/dating-web-app".into()))
            .android(AndroidSettings {
                keystore_password: Some("s3cret".into()),
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn existing_keystore_is_reused_without_keytool() {
        let dir = tempfile::tempdir().unwrap();
        let android = dir.path().join("android");
        std::fs::create_dir_all(&android).unwrap();
        std::fs::write(android.join(KEYSTORE_FILE), b"keystore").unwrap();

        let keystore = provision_keystore(&config(dir.path()), "example.com")
            .await
            .unwrap();

        assert_eq!(keystore.path, android.join(KEYSTORE_FILE));
        assert_eq!(keystore.alias, "android");
        assert_eq!(keystore.password.value(), "s3cret");
        assert_eq!(std::fs::read(&keystore.path).unwrap(), b"keystore");
    }

    #[test]
    fn keytool_command_masks_passwords() {
        let dir = tempfile::tempdir().unwrap();
        let keystore = AndroidKeystore {
            path: dir.path().join(KEYSTORE_FILE),
            alias: KEY_ALIAS.into(),
            password: super::super::ResolvedSecret {
                value: "s3cret".into(),
                source: super::super::SecretSource::EnvSupplied,
            },
        };
        let display = keytool_genkeypair(&keystore, "example.com", "dating-web-app").display();

        assert!(display.starts_with("keytool -genkeypair -v -keystore "));
        assert!(display.contains("-alias android"));
        assert!(display.contains("CN=example.com, OU=dating-web-app"));
        assert!(!display.contains("s3cret"));
    }
}
