//! Command line interface for the PWA packager.
//!
//! Parses arguments, assembles a [`PackagerConfig`](crate::packager::PackagerConfig)
//! and packages the selected platform. Artifact paths go to stdout, progress
//! goes to the log on stderr.

mod args;

pub use args::{AndroidArgs, Args, Command, CommonArgs, IosArgs, WindowsArgs};

use crate::error::Result;
use crate::packager::{PackagedArtifact, Packager};
use std::io::Write;

/// Main CLI entry point
///
/// Usage errors exit 1 like every other failure; `--help` and `--version`
/// exit 0.
pub async fn run() -> Result<i32> {
    match Args::try_parse_args() {
        Ok(args) => execute(args).await,
        Err(e) => {
            e.print()?;
            Ok(if e.use_stderr() { 1 } else { 0 })
        }
    }
}

/// Packages the platform selected by `args`.
pub async fn execute(args: Args) -> Result<i32> {
    args.validate()?;
    let platform = args.platform();
    let json = args.json;

    let config = args.into_config()?;
    let artifacts = Packager::new(config).package(platform).await?;

    print_artifacts(&artifacts, json)?;
    if !artifacts.is_empty() {
        log::info!("✓ Packaged {} {platform} artifact(s)", artifacts.len());
    }
    Ok(0)
}

fn print_artifacts(artifacts: &[PackagedArtifact], json: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(artifacts)?)?;
    } else {
        for artifact in artifacts {
            writeln!(stdout, "{}", artifact.path.display())?;
        }
    }
    Ok(())
}
