//! Resizing one icon to one target size.
//!
//! Three strategies are tried in order: the OS resize tool, in-process
//! resampling with `image`, and finally a plain copy of the source. A failed
//! strategy is logged and the next one runs.

use crate::packager::{
    builder::tool_detection::{RESIZE_TOOL, ResizeTool, ResizeToolKind},
    error::{Error, ErrorExt, Result},
    utils::process::ToolCommand,
};
use image::{GenericImageView, RgbaImage, imageops::FilterType};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which strategy produced an icon file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResizeOutcome {
    /// Resized by the OS tool.
    Tool,
    /// Resized in-process.
    InProcess,
    /// Source copied unchanged.
    Copied,
}

impl fmt::Display for ResizeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResizeOutcome::Tool => "resize tool",
            ResizeOutcome::InProcess => "in-process",
            ResizeOutcome::Copied => "copied",
        })
    }
}

/// Writes `source` resized to `width`×`height` at `dest`.
///
/// Non-square targets keep the source aspect ratio and are padded with
/// transparency.
///
/// # Errors
///
/// Only when even copying the source fails.
pub async fn resize_icon(source: &Path, dest: &Path, width: u32, height: u32) -> Result<ResizeOutcome> {
    if let Some(tool) = RESIZE_TOOL.as_ref() {
        match resize_with_tool(tool, source, dest, width, height).await {
            Ok(()) => return Ok(ResizeOutcome::Tool),
            Err(e) => log::warn!(
                "{} could not resize {} to {width}x{height}, resizing in-process: {e}",
                tool.kind.program(),
                source.display()
            ),
        }
    }

    match resize_in_process(source.to_path_buf(), dest.to_path_buf(), width, height).await {
        Ok(()) => return Ok(ResizeOutcome::InProcess),
        Err(e) => log::warn!(
            "Could not resize {} to {width}x{height}, copying original: {e}",
            source.display()
        ),
    }

    tokio::fs::copy(source, dest)
        .await
        .fs_context("copying icon", dest)?;
    Ok(ResizeOutcome::Copied)
}

async fn resize_with_tool(
    tool: &ResizeTool,
    source: &Path,
    dest: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    for command in tool_commands(tool, source, dest, width, height) {
        command.run().await?;
    }
    Ok(())
}

fn tool_commands(
    tool: &ResizeTool,
    source: &Path,
    dest: &Path,
    width: u32,
    height: u32,
) -> Vec<ToolCommand> {
    match tool.kind {
        ResizeToolKind::Sips if width == height => vec![
            ToolCommand::new(&tool.path)
                .arg("-z")
                .arg(height.to_string())
                .arg(width.to_string())
                .arg(source)
                .arg("--out")
                .arg(dest),
        ],
        ResizeToolKind::Sips => vec![
            ToolCommand::new(&tool.path)
                .arg("-Z")
                .arg(width.min(height).to_string())
                .arg(source)
                .arg("--out")
                .arg(dest),
            ToolCommand::new(&tool.path)
                .arg("-p")
                .arg(height.to_string())
                .arg(width.to_string())
                .arg(dest),
        ],
        ResizeToolKind::Magick | ResizeToolKind::Convert => {
            let geometry = format!("{width}x{height}");
            vec![
                ToolCommand::new(&tool.path)
                    .arg(source)
                    .arg("-resize")
                    .arg(&geometry)
                    .args(["-background", "none", "-gravity", "center", "-extent"])
                    .arg(&geometry)
                    .arg(dest),
            ]
        }
    }
}

async fn resize_in_process(source: PathBuf, dest: PathBuf, width: u32, height: u32) -> Result<()> {
    tokio::task::spawn_blocking(move || -> Result<()> {
        let image = image::open(&source).map_err(|e| {
            Error::GenericError(format!("failed to decode {}: {e}", source.display()))
        })?;
        let resized = fit_and_pad(&image, width, height);
        resized.save(&dest).map_err(|e| {
            Error::GenericError(format!("failed to encode {}: {e}", dest.display()))
        })
    })
    .await
    .map_err(|e| Error::GenericError(format!("resize task failed: {e}")))?
}

fn fit_and_pad(image: &image::DynamicImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.to_rgba8();
    }
    let (source_width, source_height) = image.dimensions();
    if u64::from(source_width) * u64::from(height) == u64::from(source_height) * u64::from(width) {
        return image
            .resize_exact(width, height, FilterType::Lanczos3)
            .to_rgba8();
    }

    let fitted = image.resize(width, height, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::new(width, height);
    let x = i64::from((width - fitted.width()) / 2);
    let y = i64::from((height - fitted.height()) / 2);
    image::imageops::overlay(&mut canvas, &fitted, x, y);
    canvas
}
