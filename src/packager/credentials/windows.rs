//! Self-signed MSIX signing certificate.

use super::{ResolvedSecret, SecretResolver};
use crate::packager::{
    error::{Context, ErrorExt, Result},
    settings::PackagerConfig,
    utils::process::ToolCommand,
};
use std::path::{Path, PathBuf};

/// Certificate password cache file inside the Windows project directory.
pub const CERTIFICATE_PASSWORD_CACHE: &str = ".certificate-password";

/// PKCS#12 certificate file inside the Windows project directory.
pub const CERTIFICATE_FILE: &str = "certificate.pfx";

const CERTIFICATE_VALIDITY_DAYS: &str = "3650";

/// A certificate MSBuild can sign the package with.
#[derive(Debug, Clone)]
pub struct SigningCertificate {
    pub pfx_path: PathBuf,
    pub password: ResolvedSecret,
    /// Subject; must equal the manifest's publisher.
    pub subject: String,
}

/// Resolves the certificate password and creates the certificate if absent.
pub async fn provision_certificate(config: &PackagerConfig) -> Result<SigningCertificate> {
    let windows_dir = config.windows_dir();
    let password = SecretResolver::new(
        "certificate password",
        windows_dir.join(CERTIFICATE_PASSWORD_CACHE),
        config.repository_name(),
    )
    .with_override(config.windows().certificate_password.clone())
    .resolve()
    .await?;

    let certificate = SigningCertificate {
        pfx_path: windows_dir.join(CERTIFICATE_FILE),
        password,
        subject: format!("CN={}", config.windows().publisher),
    };

    if certificate.pfx_path.is_file() {
        log::info!("Reusing certificate {}", certificate.pfx_path.display());
        return Ok(certificate);
    }

    log::info!("Generating self-signed certificate for {}", certificate.subject);
    tokio::fs::create_dir_all(&windows_dir)
        .await
        .fs_context("creating directory", &windows_dir)?;

    // Key and certificate PEMs only live until the PFX is exported.
    let scratch = tempfile::tempdir()?;
    let key = scratch.path().join("key.pem");
    let cert = scratch.path().join("cert.pem");

    openssl_self_signed(&key, &cert, &certificate.subject)
        .run()
        .await
        .context("creating self-signed certificate")?;
    openssl_export_pfx(&key, &cert, &certificate)
        .run()
        .await
        .context("exporting PKCS#12 certificate")?;

    log::info!("✓ Created certificate {}", certificate.pfx_path.display());
    Ok(certificate)
}

fn openssl_self_signed(key: &Path, cert: &Path, subject: &str) -> ToolCommand {
    ToolCommand::new("openssl")
        .args(["req", "-x509", "-newkey", "rsa:2048", "-nodes", "-sha256"])
        .args(["-days", CERTIFICATE_VALIDITY_DAYS])
        .arg("-keyout")
        .arg(key)
        .arg("-out")
        .arg(cert)
        .arg("-subj")
        .arg(format!("/{}", subject))
        // MSIX signing requires the code signing extended key usage.
        .args(["-addext", "extendedKeyUsage=codeSigning"])
        .args(["-addext", "basicConstraints=CA:FALSE"])
}

fn openssl_export_pfx(key: &Path, cert: &Path, certificate: &SigningCertificate) -> ToolCommand {
    ToolCommand::new("openssl")
        .args(["pkcs12", "-export"])
        .arg("-inkey")
        .arg(key)
        .arg("-in")
        .arg(cert)
        .arg("-out")
        .arg(&certificate.pfx_path)
        .arg("-passout")
        .secret_arg(format!("pass:{}", certificate.password.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::credentials::SecretSource;
    use crate::packager::settings::{PackagerConfigBuilder, WindowsSettings};

    #[tokio::test]
    async fn existing_certificate_is_reused_with_cached_password() {
        let dir = tempfile::tempdir().unwrap();
        let windows = dir.path().join("windows");
        std::fs::create_dir_all(&windows).unwrap();
        std::fs::write(windows.join(CERTIFICATE_FILE), b"pfx").unwrap();
        std::fs::write(windows.join(CERTIFICATE_PASSWORD_CACHE), "cached\n").unwrap();

        let config = PackagerConfigBuilder::new()
            .project_dir(dir.path())
            .base_url(Some("https://example.com/".into()))
            .windows(WindowsSettings {
                publisher: "Amora".into(),
                ..Default::default()
            })
            .build()
            .unwrap();

        let certificate = provision_certificate(&config).await.unwrap();
        assert_eq!(certificate.subject, "CN=Amora");
        assert_eq!(certificate.password.value(), "cached");
        assert_eq!(certificate.password.source(), SecretSource::Cached);
        assert_eq!(std::fs::read(&certificate.pfx_path).unwrap(), b"pfx");
    }

    #[test]
    fn pfx_export_masks_password() {
        let certificate = SigningCertificate {
            pfx_path: PathBuf::from("windows/certificate.pfx"),
            password: ResolvedSecret {
                value: "s3cret".into(),
                source: SecretSource::Generated,
            },
            subject: "CN=Amora".into(),
        };
        let display =
            openssl_export_pfx(Path::new("key.pem"), Path::new("cert.pem"), &certificate).display();
        assert!(display.starts_with("openssl pkcs12 -export"));
        assert!(display.ends_with("-passout ******"));
    }

    #[test]
    fn self_signed_subject_is_a_path() {
        let display =
            openssl_self_signed(Path::new("key.pem"), Path::new("cert.pem"), "CN=Amora").display();
        assert!(display.contains("-subj /CN=Amora"));
        assert!(display.contains("extendedKeyUsage=codeSigning"));
    }
}
