//! Shared helpers for file system work, archives and child processes.

pub mod archive;
pub mod fs;
pub mod process;
