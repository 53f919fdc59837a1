//! PWA Packager - wraps a progressive web app into platform packages.
//!
//! This binary creates an Android TWA, an iOS IPA or a Windows MSIX from a
//! built web app. Exit code 0 means every artifact exists in the output
//! directory; any failure exits 1.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match pwa_packager::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
