//! Signing credential provisioning.
//!
//! Passwords for the Android keystore, the iOS build keychain and the Windows
//! signing certificate are resolved through one ordered chain:
//!
//! 1. [`SecretSource::EnvSupplied`] - an explicit override (flag or env var)
//! 2. [`SecretSource::Cached`] - a plaintext cache file in the workspace
//! 3. [`SecretSource::Generated`] - `<repo-name>-<random>`, written to the cache
//!
//! Reusing the cached value keeps update signatures stable across CI runs
//! without a secret store. The cache is plaintext; the CI workspace is
//! trusted to be ephemeral and access-controlled.

pub mod android;
pub mod ios;
pub mod windows;

use crate::packager::error::{Error, ErrorExt, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Length of the random part of a generated secret.
const GENERATED_SUFFIX_LEN: usize = 16;

/// Where a resolved secret came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SecretSource {
    /// Supplied by flag or environment variable.
    EnvSupplied,
    /// Read from the cache file of an earlier run.
    Cached,
    /// Freshly generated and persisted to the cache file.
    Generated,
}

impl SecretSource {
    /// Resolution order.
    pub const CHAIN: [SecretSource; 3] = [
        SecretSource::EnvSupplied,
        SecretSource::Cached,
        SecretSource::Generated,
    ];
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SecretSource::EnvSupplied => "environment",
            SecretSource::Cached => "cache",
            SecretSource::Generated => "generated",
        })
    }
}

/// A secret value and its origin.
#[derive(Clone, Eq, PartialEq)]
pub struct ResolvedSecret {
    value: String,
    source: SecretSource,
}

impl ResolvedSecret {
    /// The secret value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Where the value came from.
    pub fn source(&self) -> SecretSource {
        self.source
    }
}

impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Resolves one secret through the env → cache → generate chain.
///
/// # Examples
///
/// ```no_run
/// use pwa_packager::packager::credentials::SecretResolver;
///
/// # async fn example() -> pwa_packager::packager::Result<()> {
/// let secret = SecretResolver::new("keystore password", "android/.keystore-password", "dating-web-app")
///     .with_override(std::env::var("ANDROID_KEYSTORE_PASSWORD").ok())
///     .resolve()
///     .await?;
/// println!("using {} keystore password", secret.source());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SecretResolver {
    label: &'static str,
    cache_path: PathBuf,
    prefix: String,
    override_value: Option<String>,
}

impl SecretResolver {
    /// Creates a resolver caching to `cache_path` and prefixing generated
    /// values with `prefix`.
    pub fn new(label: &'static str, cache_path: impl AsRef<Path>, prefix: impl Into<String>) -> Self {
        Self {
            label,
            cache_path: cache_path.as_ref().to_path_buf(),
            prefix: prefix.into(),
            override_value: None,
        }
    }

    /// Sets the explicit override. Blank values count as absent.
    pub fn with_override(mut self, value: Option<String>) -> Self {
        self.override_value = value;
        self
    }

    /// Walks the chain and returns the first available secret.
    pub async fn resolve(&self) -> Result<ResolvedSecret> {
        for source in SecretSource::CHAIN {
            if let Some(value) = self.try_source(source).await? {
                log::info!("Using {} from {}", self.label, source);
                return Ok(ResolvedSecret { value, source });
            }
        }
        Err(Error::GenericError(format!("no source produced a {}", self.label)))
    }

    async fn try_source(&self, source: SecretSource) -> Result<Option<String>> {
        match source {
            SecretSource::EnvSupplied => Ok(self
                .override_value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)),
            SecretSource::Cached => self.read_cache().await,
            SecretSource::Generated => {
                let value = self.generate();
                self.write_cache(&value).await?;
                Ok(Some(value))
            }
        }
    }

    async fn read_cache(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.cache_path).await {
            Ok(content) => {
                let value = content.trim();
                if value.is_empty() {
                    log::warn!(
                        "Ignoring empty {} cache at {}",
                        self.label,
                        self.cache_path.display()
                    );
                    Ok(None)
                } else {
                    Ok(Some(value.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).fs_context("reading secret cache", &self.cache_path),
        }
    }

    fn generate(&self) -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.prefix, &random[..GENERATED_SUFFIX_LEN])
    }

    async fn write_cache(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating directory", parent)?;
        }
        tokio::fs::write(&self.cache_path, value)
            .await
            .fs_context("writing secret cache", &self.cache_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.cache_path, std::fs::Permissions::from_mode(0o600))
                .await
                .fs_context("restricting secret cache", &self.cache_path)?;
        }

        log::info!(
            "Generated new {} and cached it at {}",
            self.label,
            self.cache_path.display()
        );
        Ok(())
    }
}
