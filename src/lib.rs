//! Progressive web app packager for Android, iOS and Windows.
//!
//! This library wraps a built web app into:
//! - Android Trusted Web Activity packages (APK, AAB)
//! - iOS web view apps (IPA)
//! - Windows web view apps (MSIX)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod packager;

// Re-export commonly used types
pub use error::{CliError, PackagerError, Result};
