//! External tool detection.
//!
//! Required tools are looked up on `PATH` before a platform build starts so a
//! missing tool fails the run before anything is written. Optional tools are
//! probed once and cached.

use crate::packager::error::{Error, Result};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Image resize tool of the host OS, if installed.
///
/// `sips` on macOS, ImageMagick's `magick` on Windows and `convert`
/// elsewhere. Cached to avoid repeated `PATH` scans while resizing.
pub static RESIZE_TOOL: LazyLock<Option<ResizeTool>> = LazyLock::new(|| {
    let kind = if cfg!(target_os = "macos") {
        ResizeToolKind::Sips
    } else if cfg!(windows) {
        ResizeToolKind::Magick
    } else {
        ResizeToolKind::Convert
    };

    match which::which(kind.program()) {
        Ok(path) => {
            log::debug!("Found {} at: {}", kind.program(), path.display());
            Some(ResizeTool { kind, path })
        }
        Err(e) => {
            log::debug!(
                "{} not found in PATH: {}. Icons will be resized in-process.",
                kind.program(),
                e
            );
            None
        }
    }
});

/// Flavour of the OS resize tool; each takes different arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResizeToolKind {
    Sips,
    Magick,
    Convert,
}

impl ResizeToolKind {
    /// Executable name.
    pub fn program(self) -> &'static str {
        match self {
            ResizeToolKind::Sips => "sips",
            ResizeToolKind::Magick => "magick",
            ResizeToolKind::Convert => "convert",
        }
    }
}

/// A located resize tool.
#[derive(Clone, Debug)]
pub struct ResizeTool {
    pub kind: ResizeToolKind,
    pub path: PathBuf,
}

/// Locates a required tool on `PATH`.
///
/// # Errors
///
/// [`Error::MissingInput`] naming the tool when it is not installed.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            log::debug!("Found {name} at: {}", path.display());
            Ok(path)
        }
        Err(e) => Err(Error::MissingInput(format!("`{name}` on PATH ({e})"))),
    }
}

/// Locates every tool in `names`, failing on the first missing one.
pub fn require_tools(names: &[&str]) -> Result<Vec<PathBuf>> {
    names.iter().map(|name| require_tool(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_missing_input() {
        let err = require_tool("pwa-packager-no-such-tool").unwrap_err();
        assert!(err.is_missing_input());
        assert!(err.to_string().contains("pwa-packager-no-such-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn present_tools_resolve_to_paths() {
        let paths = require_tools(&["sh"]).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("sh"));
    }
}
