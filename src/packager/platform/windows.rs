//! Windows MSIX package via MSBuild.

use super::{Platform, PlatformBuilder};
use crate::packager::{
    builder::tool_detection::require_tools,
    credentials::windows::{SigningCertificate, provision_certificate},
    error::{Context, Error, Result},
    icons::{IconAssetSet, generate_windows_assets},
    manifest::{WebInputs, windows::WindowsConfig},
    settings::PackagerConfig,
    utils::{
        fs::{copy_file, create_dir_all},
        process::ToolCommand,
    },
};
use std::path::{Path, PathBuf};

/// MSBuild package output directory, relative to the Windows project
/// directory.
pub const APP_PACKAGES_DIR: &str = "AppPackages";

/// A wrapper solution with its certificate and logos in place.
#[derive(Debug)]
pub struct WindowsStaged {
    pub package: WindowsConfig,
    pub certificate: SigningCertificate,
    pub icons: Option<IconAssetSet>,
}

/// Builds the Windows MSIX package.
#[derive(Debug)]
pub struct WindowsBuilder<'a> {
    config: &'a PackagerConfig,
}

impl<'a> WindowsBuilder<'a> {
    pub fn new(config: &'a PackagerConfig) -> Self {
        Self { config }
    }

    fn msbuild(&self, staged: &WindowsStaged) -> ToolCommand {
        let windows_dir = self.config.windows_dir();
        let package_dir = windows_dir.join(APP_PACKAGES_DIR);
        ToolCommand::new("msbuild")
            .arg(&self.config.windows().solution)
            .arg("/p:Configuration=Release")
            .arg(format!("/p:Platform={}", staged.package.arch.msbuild_platform()))
            .arg("/p:AppxBundle=Never")
            .arg("/p:UapAppxPackageBuildMode=SideloadOnly")
            .arg("/p:GenerateAppxPackageOnBuild=true")
            .arg("/p:AppxPackageSigningEnabled=true")
            .arg(format!("/p:AppxPackageDir={}{}", package_dir.display(), std::path::MAIN_SEPARATOR))
            .arg(format!(
                "/p:PackageCertificateKeyFile={}",
                staged.certificate.pfx_path.display()
            ))
            .secret_arg(format!(
                "/p:PackageCertificatePassword={}",
                staged.certificate.password.value()
            ))
            .current_dir(windows_dir)
    }
}

impl PlatformBuilder for WindowsBuilder<'_> {
    type Resolved = WindowsConfig;
    type Staged = WindowsStaged;

    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["msbuild", "openssl"]
    }

    async fn validate_inputs(&self) -> Result<WindowsConfig> {
        let inputs = WebInputs::load(self.config).await?;
        let package = WindowsConfig::resolve(self.config, &inputs)?;
        if !self.config.manifest_only() {
            require_tools(self.required_tools())?;
        }
        Ok(package)
    }

    async fn write_manifest(&self, package: &WindowsConfig) -> Result<Vec<PathBuf>> {
        package.write(&self.config.windows_dir()).await
    }

    async fn stage(&self, package: WindowsConfig) -> Result<WindowsStaged> {
        let icons =
            generate_windows_assets(self.config.project_dir(), &self.config.windows_dir()).await?;
        let certificate = provision_certificate(self.config).await?;
        Ok(WindowsStaged {
            package,
            certificate,
            icons,
        })
    }

    async fn invoke(&self, staged: &WindowsStaged) -> Result<()> {
        log::info!(
            "Building {} {} ({})",
            staged.package.display_name,
            staged.package.version,
            staged.package.architecture
        );
        if let Some(icons) = &staged.icons {
            log::info!("Using {} logos from {}", icons.len(), icons.source.display());
        }
        create_dir_all(&self.config.windows_dir().join(APP_PACKAGES_DIR), true).await?;
        self.msbuild(staged)
            .run()
            .await
            .context("building Windows package")?;
        Ok(())
    }

    async fn package(&self, _staged: &WindowsStaged) -> Result<Vec<PathBuf>> {
        let msix = find_msix(&self.config.windows_dir().join(APP_PACKAGES_DIR))?;
        let file_name = msix
            .file_name()
            .with_context(|| format!("no file name in {}", msix.display()))?;
        let dest = self.config.output_dir().join(file_name);
        copy_file(&msix, &dest).await?;
        log::info!("✓ Copied {}", dest.display());
        Ok(vec![dest])
    }
}

/// First `*.msix` under `package_dir`, in path order.
pub fn find_msix(package_dir: &Path) -> Result<PathBuf> {
    let pattern = format!(
        "{}/**/*.msix",
        glob::Pattern::escape(&package_dir.to_string_lossy())
    );
    let mut matches: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| Error::GenericError(format!("invalid MSIX search pattern {pattern}: {e}")))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    matches.sort();
    matches.into_iter().next().ok_or_else(|| {
        Error::MissingInput(format!(
            "*.msix under {} (expected msbuild output)",
            package_dir.display()
        ))
    })
}
