//! Icon and asset generation.
//!
//! One source icon is discovered in the project, then resized into every
//! platform target. Icon generation never fails a build: a missing source
//! skips the step and a failed resize falls back (see [`resize`]).

pub mod ico;
pub mod resize;

use crate::packager::{
    error::{ErrorExt, Result},
    manifest::write_generated,
};
use std::path::{Path, PathBuf};

/// Source icon candidates relative to the project directory, in priority
/// order.
pub const ICON_CANDIDATES: [&str; 6] = [
    "icon.png",
    "public/icon-512.png",
    "public/icon.png",
    "public/logo512.png",
    "public/android-chrome-512x512.png",
    "assets/icon.png",
];

/// App icon set directory, relative to the iOS project directory.
pub const APP_ICON_SET_DIR: &str = "Assets.xcassets/AppIcon.appiconset";

/// Logo directory, relative to the Windows project directory.
pub const WINDOWS_IMAGES_DIR: &str = "Images";

/// Application icon file, relative to the Windows project directory.
pub const WINDOWS_ICO_FILE: &str = "app.ico";

/// Pixel sizes of the iOS app icon set.
pub const IOS_ICON_SIZES: [u32; 13] = [1024, 180, 167, 152, 120, 87, 80, 76, 60, 58, 40, 29, 20];

/// Asset catalog slots as `(idiom, size in points, scale, pixels)`.
const IOS_ICON_SLOTS: [(&str, &str, u32, u32); 18] = [
    ("iphone", "20x20", 2, 40),
    ("iphone", "20x20", 3, 60),
    ("iphone", "29x29", 2, 58),
    ("iphone", "29x29", 3, 87),
    ("iphone", "40x40", 2, 80),
    ("iphone", "40x40", 3, 120),
    ("iphone", "60x60", 2, 120),
    ("iphone", "60x60", 3, 180),
    ("ipad", "20x20", 1, 20),
    ("ipad", "20x20", 2, 40),
    ("ipad", "29x29", 1, 29),
    ("ipad", "29x29", 2, 58),
    ("ipad", "40x40", 1, 40),
    ("ipad", "40x40", 2, 80),
    ("ipad", "76x76", 1, 76),
    ("ipad", "76x76", 2, 152),
    ("ipad", "83.5x83.5", 2, 167),
    ("ios-marketing", "1024x1024", 1, 1024),
];

/// MSIX logos as `(name, width, height)`.
pub const WINDOWS_LOGOS: [(&str, u32, u32); 5] = [
    ("Square44x44Logo", 44, 44),
    ("Square150x150Logo", 150, 150),
    ("Wide310x150Logo", 310, 150),
    ("StoreLogo", 50, 50),
    ("SplashScreen", 620, 300),
];

/// One output image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconTarget {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl IconTarget {
    pub fn new(file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            file_name: file_name.into(),
            width,
            height,
        }
    }
}

/// Generated icons, in target order.
#[derive(Clone, Debug, Default)]
pub struct IconAssetSet {
    pub source: PathBuf,
    pub entries: Vec<(IconTarget, PathBuf)>,
}

impl IconAssetSet {
    /// Path generated for `file_name`, if it was produced.
    pub fn get(&self, file_name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(target, _)| target.file_name == file_name)
            .map(|(_, path)| path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the first existing icon candidate under `project_dir`.
pub fn discover_source_icon(project_dir: &Path) -> Option<PathBuf> {
    ICON_CANDIDATES
        .iter()
        .map(|candidate| project_dir.join(candidate))
        .find(|path| path.is_file())
}

/// iOS app icon file name for a pixel size.
pub fn ios_icon_file_name(pixels: u32) -> String {
    format!("AppIcon-{pixels}.png")
}

/// One target per distinct iOS icon size.
pub fn ios_icon_targets() -> Vec<IconTarget> {
    IOS_ICON_SIZES
        .iter()
        .map(|&size| IconTarget::new(ios_icon_file_name(size), size, size))
        .collect()
}

/// `Contents.json` of the app icon set.
pub fn ios_contents_json() -> serde_json::Value {
    let images: Vec<serde_json::Value> = IOS_ICON_SLOTS
        .iter()
        .map(|(idiom, size, scale, pixels)| {
            serde_json::json!({
                "idiom": idiom,
                "size": size,
                "scale": format!("{scale}x"),
                "filename": ios_icon_file_name(*pixels),
            })
        })
        .collect();
    serde_json::json!({
        "images": images,
        "info": { "author": "xcode", "version": 1 },
    })
}

/// One target per MSIX logo.
pub fn windows_logo_targets() -> Vec<IconTarget> {
    WINDOWS_LOGOS
        .iter()
        .map(|(name, width, height)| IconTarget::new(format!("{name}.png"), *width, *height))
        .collect()
}

/// Resizes `source` into every target under `out_dir`.
///
/// A target whose every fallback failed is left out of the returned set.
pub async fn generate_icon_set(
    source: &Path,
    out_dir: &Path,
    targets: &[IconTarget],
) -> Result<IconAssetSet> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .fs_context("creating directory", out_dir)?;

    let mut set = IconAssetSet {
        source: source.to_path_buf(),
        entries: Vec::with_capacity(targets.len()),
    };
    for target in targets {
        let dest = out_dir.join(&target.file_name);
        match resize::resize_icon(source, &dest, target.width, target.height).await {
            Ok(outcome) => {
                log::debug!(
                    "{} {}x{} ({outcome})",
                    target.file_name,
                    target.width,
                    target.height
                );
                set.entries.push((target.clone(), dest));
            }
            Err(e) => log::warn!("Skipping icon {}: {e}", target.file_name),
        }
    }
    Ok(set)
}

/// Generates the iOS app icon set, or skips when no source icon exists.
pub async fn generate_ios_app_icons(
    project_dir: &Path,
    ios_dir: &Path,
) -> Result<Option<IconAssetSet>> {
    let Some(source) = discover_source_icon(project_dir) else {
        log::warn!("No source icon found, skipping iOS app icons");
        return Ok(None);
    };
    log::info!("Generating iOS app icons from {}", source.display());

    let catalog_dir = ios_dir.join(APP_ICON_SET_DIR);
    let set = generate_icon_set(&source, &catalog_dir, &ios_icon_targets()).await?;

    if let Some(catalog_root) = catalog_dir.parent() {
        let root_contents = serde_json::json!({ "info": { "author": "xcode", "version": 1 } });
        write_generated(
            &catalog_root.join("Contents.json"),
            &serde_json::to_string_pretty(&root_contents)?,
        )
        .await?;
    }
    write_generated(
        &catalog_dir.join("Contents.json"),
        &serde_json::to_string_pretty(&ios_contents_json())?,
    )
    .await?;

    log::info!("✓ Generated {} iOS app icons", set.len());
    Ok(Some(set))
}

/// Generates the MSIX logos and `app.ico`, or skips when no source icon
/// exists.
pub async fn generate_windows_assets(
    project_dir: &Path,
    windows_dir: &Path,
) -> Result<Option<IconAssetSet>> {
    let Some(source) = discover_source_icon(project_dir) else {
        log::warn!("No source icon found, skipping Windows logos");
        return Ok(None);
    };
    log::info!("Generating Windows logos from {}", source.display());

    let images_dir = windows_dir.join(WINDOWS_IMAGES_DIR);
    let set = generate_icon_set(&source, &images_dir, &windows_logo_targets()).await?;

    let ico_path = windows_dir.join(WINDOWS_ICO_FILE);
    if let Err(e) = ico::write_ico(&source, &ico_path).await {
        log::warn!("Skipping {}: {e}", ico_path.display());
    }

    log::info!("✓ Generated {} Windows logos", set.len());
    Ok(Some(set))
}
