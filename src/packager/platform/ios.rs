//! iOS web view wrapper via XcodeGen and xcodebuild.

use super::{Platform, PlatformBuilder};
use crate::packager::{
    builder::tool_detection::require_tools,
    credentials::ios::{BuildKeychain, provision_keychain},
    error::{Context, Error, Result},
    icons::{IconAssetSet, generate_ios_app_icons},
    manifest::{WebInputs, ios::{IosProject, PROJECT_YML_FILE}},
    settings::PackagerConfig,
    utils::{
        archive::zip_dir,
        fs::{copy_dir, remove_dir_all},
        process::ToolCommand,
    },
};
use std::path::{Path, PathBuf};

/// Derived data directory, relative to the iOS project directory.
pub const DERIVED_DATA_DIR: &str = "build";

/// Where xcodebuild leaves the device build, relative to derived data.
const PRODUCTS_DIR: &str = "Build/Products/Release-iphoneos";

/// An XcodeGen project with its keychain and icons in place.
#[derive(Debug)]
pub struct IosStaged {
    pub project: IosProject,
    pub keychain: BuildKeychain,
    pub icons: Option<IconAssetSet>,
}

/// Builds the iOS IPA.
#[derive(Debug)]
pub struct IosBuilder<'a> {
    config: &'a PackagerConfig,
}

impl<'a> IosBuilder<'a> {
    pub fn new(config: &'a PackagerConfig) -> Self {
        Self { config }
    }
}

impl PlatformBuilder for IosBuilder<'_> {
    type Resolved = IosProject;
    type Staged = IosStaged;

    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["xcodegen", "xcodebuild", "security"]
    }

    async fn validate_inputs(&self) -> Result<IosProject> {
        let inputs = WebInputs::load(self.config).await?;
        let project = IosProject::resolve(self.config, &inputs)?;
        if !self.config.manifest_only() {
            require_tools(self.required_tools())?;
        }
        Ok(project)
    }

    async fn write_manifest(&self, project: &IosProject) -> Result<Vec<PathBuf>> {
        project.write(&self.config.ios_dir()).await
    }

    async fn stage(&self, project: IosProject) -> Result<IosStaged> {
        let icons = generate_ios_app_icons(self.config.project_dir(), &self.config.ios_dir()).await?;
        let keychain = provision_keychain(self.config).await?;
        Ok(IosStaged {
            project,
            keychain,
            icons,
        })
    }

    async fn invoke(&self, staged: &IosStaged) -> Result<()> {
        let ios_dir = self.config.ios_dir();

        log::info!("Generating Xcode project {}", staged.project.target_name);
        ToolCommand::new("xcodegen")
            .args(["generate", "--spec", PROJECT_YML_FILE])
            .current_dir(&ios_dir)
            .run()
            .await
            .context("generating Xcode project")?;

        // A stale app from an earlier build must not end up in the IPA.
        remove_dir_all(&ios_dir.join(DERIVED_DATA_DIR).join(PRODUCTS_DIR)).await?;

        match &staged.icons {
            Some(icons) => log::info!(
                "Building {} for iphoneos with {} app icons from {}",
                staged.project.target_name,
                icons.len(),
                icons.source.display()
            ),
            None => log::info!(
                "Building {} for iphoneos without app icons",
                staged.project.target_name
            ),
        }
        let signing_keychain = staged
            .keychain
            .signing_enabled
            .then_some(staged.keychain.path.as_path());
        xcodebuild(&staged.project.target_name, signing_keychain)
            .current_dir(&ios_dir)
            .run()
            .await
            .context("building iOS app")?;
        Ok(())
    }

    async fn package(&self, staged: &IosStaged) -> Result<Vec<PathBuf>> {
        let ipa = package_ipa(
            &self.config.ios_dir(),
            &staged.project.target_name,
            &self.config.output_dir(),
        )
        .await?;
        Ok(vec![ipa])
    }

    async fn cleanup(&self, staged: &IosStaged) {
        staged.keychain.release().await;
    }
}

/// `xcodebuild` for a Release device build, signed with the keychain when
/// one is given.
fn xcodebuild(target_name: &str, signing_keychain: Option<&Path>) -> ToolCommand {
    let command = ToolCommand::new("xcodebuild")
        .arg("-project")
        .arg(format!("{target_name}.xcodeproj"))
        .args(["-scheme", target_name])
        .args(["-configuration", "Release", "-sdk", "iphoneos"])
        .args(["-derivedDataPath", DERIVED_DATA_DIR]);

    let command = match signing_keychain {
        Some(keychain) => {
            command.arg(format!("OTHER_CODE_SIGN_FLAGS=--keychain {}", keychain.display()))
        }
        None => command.args([
            "CODE_SIGNING_ALLOWED=NO",
            "CODE_SIGNING_REQUIRED=NO",
            "CODE_SIGN_IDENTITY=",
        ]),
    };
    command.arg("build")
}

/// Zips `<target>.app` as `Payload/<target>.app` into `<target>.ipa`.
pub async fn package_ipa(ios_dir: &Path, target_name: &str, output_dir: &Path) -> Result<PathBuf> {
    let app = ios_dir
        .join(DERIVED_DATA_DIR)
        .join(PRODUCTS_DIR)
        .join(format!("{target_name}.app"));
    if !app.is_dir() {
        return Err(Error::MissingInput(format!(
            "{} (expected xcodebuild output)",
            app.display()
        )));
    }

    let staging = tempfile::tempdir()?;
    copy_dir(&app, &staging.path().join("Payload").join(format!("{target_name}.app"))).await?;

    let ipa = output_dir.join(format!("{target_name}.ipa"));
    zip_dir(staging.path(), &ipa).await?;
    log::info!("✓ Packaged {}", ipa.display());
    Ok(ipa)
}
