//! Main packaging orchestration.

use crate::{
    bail,
    packager::{
        PackagedArtifact, Result,
        error::ErrorExt,
        platform::{AndroidBuilder, IosBuilder, Platform, PlatformBuilder, WindowsBuilder},
        settings::PackagerConfig,
    },
};

use super::checksum::calculate_sha256;

/// Main packaging orchestrator.
///
/// Runs one platform's builder through its steps, strictly in order, and
/// collects checksummed artifacts.
///
/// # Examples
///
/// ```no_run
/// use pwa_packager::packager::{Packager, PackagerConfigBuilder, Platform};
///
/// # async fn example() -> pwa_packager::packager::Result<()> {
/// let config = PackagerConfigBuilder::new()
///     .base_url(Some("https://example.com/".into()))
///     .run_number(Some(42))
///     .build()?;
///
/// let artifacts = Packager::new(config).package(Platform::Android).await?;
/// for artifact in artifacts {
///     println!("{} ({} bytes)", artifact.path.display(), artifact.size);
///     println!("SHA256: {}", artifact.checksum);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Packager {
    config: PackagerConfig,
}

impl Packager {
    /// Creates a packager for the given configuration.
    pub fn new(config: PackagerConfig) -> Self {
        Self { config }
    }

    /// Packages one platform.
    ///
    /// Returns no artifacts when the configuration is manifest-only.
    pub async fn package(&self, platform: Platform) -> Result<Vec<PackagedArtifact>> {
        match platform {
            Platform::Android => self.run(AndroidBuilder::new(&self.config)).await,
            Platform::Ios => self.run(IosBuilder::new(&self.config)).await,
            Platform::Windows => self.run(WindowsBuilder::new(&self.config)).await,
        }
    }

    async fn run<B: PlatformBuilder>(&self, builder: B) -> Result<Vec<PackagedArtifact>> {
        let platform = builder.platform();
        log::info!("Packaging {platform} from {}", self.config.project_dir().display());

        let resolved = builder.validate_inputs().await?;
        let manifests = builder.write_manifest(&resolved).await?;

        if self.config.manifest_only() {
            log::info!(
                "✓ Wrote {} {platform} manifest file(s), skipping build",
                manifests.len()
            );
            return Ok(Vec::new());
        }

        let staged = builder.stage(resolved).await?;
        let built = match builder.invoke(&staged).await {
            Ok(()) => builder.package(&staged).await,
            Err(e) => Err(e),
        };
        builder.cleanup(&staged).await;
        let paths = built?;
        if paths.is_empty() {
            bail!("{platform} builder produced no artifacts");
        }

        let mut artifacts = Vec::with_capacity(paths.len());
        for path in paths {
            let size = tokio::fs::metadata(&path)
                .await
                .fs_context("reading artifact metadata", &path)?
                .len();
            let checksum = calculate_sha256(&path).await?;
            log::info!("✓ {} ({size} bytes, sha256 {checksum})", path.display());
            artifacts.push(PackagedArtifact {
                platform,
                path,
                size,
                checksum,
            });
        }

        Ok(artifacts)
    }
}
