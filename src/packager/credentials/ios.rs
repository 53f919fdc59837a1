//! Temporary build keychain for iOS code signing.

use super::{ResolvedSecret, SecretResolver};
use crate::packager::{
    error::{Context, Error, ErrorExt, Result},
    settings::PackagerConfig,
    utils::process::ToolCommand,
};
use base64::Engine;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keychain password cache file inside the iOS project directory.
pub const KEYCHAIN_PASSWORD_CACHE: &str = ".keychain-password";

/// Keychain file, relative to the iOS project directory.
pub const KEYCHAIN_FILE: &str = "build/pwa-packager.keychain";

/// Seconds before the keychain locks itself again.
const KEYCHAIN_TIMEOUT_SECS: &str = "21600";

/// An unlocked keychain for `xcodebuild`.
#[derive(Debug, Clone)]
pub struct BuildKeychain {
    pub path: PathBuf,
    pub password: ResolvedSecret,
    /// Whether a signing certificate was imported.
    pub signing_enabled: bool,
    /// User keychain search list before the build keychain was added.
    pub previous_search_list: Vec<PathBuf>,
}

impl BuildKeychain {
    /// Restores the user's keychain search list and deletes the keychain.
    ///
    /// Failures are logged, not returned, so a failed build still reports
    /// its own error.
    pub async fn release(&self) {
        if self.signing_enabled && !self.previous_search_list.is_empty() {
            let restored = ToolCommand::new("security")
                .args(["list-keychains", "-d", "user", "-s"])
                .args(&self.previous_search_list)
                .run()
                .await;
            if let Err(e) = restored {
                log::warn!("Failed to restore keychain search list: {e}");
            }
        }

        match ToolCommand::new("security")
            .arg("delete-keychain")
            .arg(&self.path)
            .run()
            .await
        {
            Ok(_) => log::info!("✓ Removed build keychain {}", self.path.display()),
            Err(e) => log::warn!("Failed to delete build keychain {}: {e}", self.path.display()),
        }
    }
}

/// Creates and unlocks the build keychain, importing the signing
/// certificate when one is configured.
///
/// Without a certificate the keychain is still created so the password stays
/// stable, and the build runs unsigned.
pub async fn provision_keychain(config: &PackagerConfig) -> Result<BuildKeychain> {
    let certificate = decode_certificate(config.ios().certificate_base64.as_deref())?;

    let ios_dir = config.ios_dir();
    let password = SecretResolver::new(
        "keychain password",
        ios_dir.join(KEYCHAIN_PASSWORD_CACHE),
        config.repository_name(),
    )
    .with_override(config.ios().keychain_password.clone())
    .resolve()
    .await?;

    let path = ios_dir.join(KEYCHAIN_FILE);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }

    // A keychain left over from an earlier run may have a different password.
    if let Err(e) = ToolCommand::new("security")
        .arg("delete-keychain")
        .arg(&path)
        .run()
        .await
    {
        log::debug!("No previous keychain to delete: {e}");
    }

    ToolCommand::new("security")
        .arg("create-keychain")
        .arg("-p")
        .secret_arg(password.value())
        .arg(&path)
        .run()
        .await
        .context("creating build keychain")?;
    ToolCommand::new("security")
        .args(["set-keychain-settings", "-lut", KEYCHAIN_TIMEOUT_SECS])
        .arg(&path)
        .run()
        .await
        .context("configuring build keychain")?;
    ToolCommand::new("security")
        .arg("unlock-keychain")
        .arg("-p")
        .secret_arg(password.value())
        .arg(&path)
        .run()
        .await
        .context("unlocking build keychain")?;

    let (signing_enabled, previous_search_list) = match certificate {
        Some(bytes) => {
            let certificate_password = config.ios().certificate_password.clone().unwrap_or_default();
            let previous =
                import_certificate(&path, password.value(), &bytes, &certificate_password).await?;
            (true, previous)
        }
        None => {
            log::warn!("No iOS signing certificate configured, building unsigned");
            (false, Vec::new())
        }
    };

    log::info!("✓ Build keychain ready at {}", path.display());
    Ok(BuildKeychain {
        path,
        password,
        signing_enabled,
        previous_search_list,
    })
}

/// Decodes the base64 PKCS#12 certificate, if configured.
fn decode_certificate(encoded: Option<&str>) -> Result<Option<Vec<u8>>> {
    let Some(encoded) = encoded.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };
    // CI secrets are often pasted with line breaks.
    let compact: String = encoded.split_whitespace().collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map(Some)
        .map_err(|e| {
            Error::GenericError(format!(
                "Invalid IOS_CERTIFICATE_BASE64 (not valid base64): {e}"
            ))
        })
}

/// Paths in `security list-keychains` output, one quoted path per line.
fn parse_search_list(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .map(|line| line.trim().trim_matches('"'))
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Imports the certificate and puts the keychain first in the user search
/// list. Returns the search list as it was before.
async fn import_certificate(
    keychain: &Path,
    keychain_password: &str,
    certificate: &[u8],
    certificate_password: &str,
) -> Result<Vec<PathBuf>> {
    log::info!("Importing signing certificate into build keychain");

    let mut file = tempfile::Builder::new()
        .prefix("pwa-packager-")
        .suffix(".p12")
        .tempfile()?;
    file.write_all(certificate)?;
    file.flush()?;

    ToolCommand::new("security")
        .arg("import")
        .arg(file.path())
        .arg("-k")
        .arg(keychain)
        .arg("-P")
        .secret_arg(certificate_password)
        .args(["-T", "/usr/bin/codesign", "-T", "/usr/bin/security"])
        .run()
        .await
        .context("importing signing certificate")?;

    ToolCommand::new("security")
        .args(["set-key-partition-list", "-S", "apple-tool:,apple:,codesign:", "-s", "-k"])
        .secret_arg(keychain_password)
        .arg(keychain)
        .run()
        .await
        .context("granting codesign access to the keychain")?;

    let listed = ToolCommand::new("security")
        .args(["list-keychains", "-d", "user"])
        .run()
        .await
        .context("reading keychain search list")?;
    let previous = parse_search_list(&String::from_utf8_lossy(&listed.stdout));

    ToolCommand::new("security")
        .args(["list-keychains", "-d", "user", "-s"])
        .arg(keychain)
        .args(previous.iter().filter(|path| path.as_path() != keychain))
        .run()
        .await
        .context("adding build keychain to the search list")?;

    log::info!("✓ Certificate imported to build keychain");
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_blank_certificate_means_unsigned() {
        assert!(decode_certificate(None).unwrap().is_none());
        assert!(decode_certificate(Some("  ")).unwrap().is_none());
    }

    #[test]
    fn certificate_tolerates_line_breaks() {
        let decoded = decode_certificate(Some("aGVs\nbG8=\n")).unwrap().unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn search_list_output_is_unquoted() {
        let output = "    \"/Users/ci/Library/Keychains/login.keychain-db\"\n    \"/Library/Keychains/System.keychain\"\n\n";
        assert_eq!(
            parse_search_list(output),
            vec![
                PathBuf::from("/Users/ci/Library/Keychains/login.keychain-db"),
                PathBuf::from("/Library/Keychains/System.keychain"),
            ]
        );
        assert!(parse_search_list("").is_empty());
    }

    #[tokio::test]
    async fn unsigned_keychain_release_leaves_search_list_alone() {
        let dir = tempfile::tempdir().unwrap();
        let keychain = BuildKeychain {
            path: dir.path().join("missing.keychain"),
            password: super::super::ResolvedSecret {
                value: "pw".into(),
                source: super::super::SecretSource::EnvSupplied,
            },
            signing_enabled: false,
            previous_search_list: Vec::new(),
        };
        // Without `security` on PATH both steps only log.
        keychain.release().await;
        assert!(!keychain.path.exists());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = decode_certificate(Some("%%%not-base64")).unwrap_err();
        assert!(err.to_string().contains("IOS_CERTIFICATE_BASE64"));
    }
}
