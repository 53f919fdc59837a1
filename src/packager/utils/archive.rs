//! Zip archive creation.

use crate::packager::error::{Error, ErrorExt, Result};
use std::io::Write;
use std::path::Path;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Compresses the contents of `src_dir` into a zip at `dest`.
///
/// Entry names are relative to `src_dir` and use `/` separators. Unix file
/// modes and symlinks are preserved so bundled executables stay runnable.
pub async fn zip_dir(src_dir: &Path, dest: &Path) -> Result<()> {
    if !src_dir.is_dir() {
        return Err(Error::MissingInput(format!(
            "{} (expected a directory)",
            src_dir.display()
        )));
    }
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }

    let src_dir = src_dir.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::create(&dest).fs_context("creating archive", &dest)?;
        let mut zip = ZipWriter::new(file);
        let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut entries: Vec<_> = walkdir::WalkDir::new(&src_dir)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .collect::<std::result::Result<_, _>>()?;
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        for entry in entries {
            let name = entry
                .path()
                .strip_prefix(&src_dir)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let options = base.unix_permissions(unix_mode(entry.path()));

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())?;
                zip.add_symlink(name, target.to_string_lossy(), options)?;
            } else if entry.file_type().is_dir() {
                zip.add_directory(name, options)?;
            } else {
                zip.start_file(name, options)?;
                let content = std::fs::read(entry.path()).fs_context("reading", entry.path())?;
                zip.write_all(&content)?;
            }
        }

        zip.finish()?;
        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("archive task failed: {e}")))?
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::symlink_metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn unix_mode(path: &Path) -> u32 {
    if path.is_dir() { 0o755 } else { 0o644 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_are_relative_to_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        std::fs::create_dir_all(staging.join("Payload/Amora.app")).unwrap();
        std::fs::write(staging.join("Payload/Amora.app/Amora"), b"binary").unwrap();
        std::fs::write(staging.join("Payload/Amora.app/Info.plist"), b"plist").unwrap();
        let ipa = dir.path().join("out/Amora.ipa");

        zip_dir(&staging, &ipa).await.unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&ipa).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(String::from).collect();
        assert!(names.contains(&"Payload/Amora.app/Amora".to_string()));
        assert!(names.contains(&"Payload/Amora.app/Info.plist".to_string()));
        assert!(names.iter().all(|n| !n.starts_with("staging")));

        let mut binary = archive.by_name("Payload/Amora.app/Amora").unwrap();
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut binary, &mut content).unwrap();
        assert_eq!(content, b"binary");
    }

    #[tokio::test]
    async fn missing_source_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = zip_dir(&dir.path().join("nope"), &dir.path().join("a.zip"))
            .await
            .unwrap_err();
        assert!(err.is_missing_input());
    }
}
