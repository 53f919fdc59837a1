//! External tool invocation.
//!
//! Every tool runs as an opaque child process: the packager waits for it to
//! exit, captures its output and treats a non-zero status as fatal. Tools that
//! only prompt interactively receive a pre-composed stdin script.

use crate::packager::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;

const REDACTED: &str = "******";

/// A child process invocation.
///
/// # Examples
///
/// ```no_run
/// use pwa_packager::packager::utils::process::ToolCommand;
///
/// # async fn example() -> pwa_packager::packager::Result<()> {
/// ToolCommand::new("bubblewrap")
///     .arg("build")
///     .arg("--skipPwaValidation")
///     .current_dir("android")
///     .stdin_script("secret\nsecret\n")
///     .run()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
    secret_args: Vec<usize>,
    current_dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
    stdin_script: Option<String>,
}

impl ToolCommand {
    /// Creates an invocation of `program`.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            secret_args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
            stdin_script: None,
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Appends an argument that is masked in logs and error messages.
    pub fn secret_arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets an environment variable for the child.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Feeds `script` to the child's stdin, then closes it.
    pub fn stdin_script(mut self, script: impl Into<String>) -> Self {
        self.stdin_script = Some(script.into());
        self
    }

    /// Tool name as shown in diagnostics.
    pub fn tool_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Command line with secret arguments masked.
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().enumerate().map(|(i, arg)| {
                if self.secret_args.contains(&i) {
                    REDACTED.to_string()
                } else {
                    arg.to_string_lossy().into_owned()
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the tool to completion.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandFailed`] if the process cannot be spawned
    /// - [`Error::ToolFailed`] if it exits non-zero; carries its stderr (or
    ///   stdout when stderr is empty)
    pub async fn run(&self) -> Result<Output> {
        log::debug!("Running: {}", self.display());

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if self.stdin_script.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let spawn_error = |error| Error::CommandFailed {
            command: self.display(),
            error,
        };
        let mut child = command.spawn().map_err(spawn_error)?;

        if let (Some(script), Some(mut stdin)) = (&self.stdin_script, child.stdin.take()) {
            // A tool that exits without reading its prompts closes the pipe;
            // its exit status decides the outcome.
            if let Err(e) = stdin.write_all(script.as_bytes()).await {
                log::debug!("{} closed stdin early: {e}", self.tool_name());
            }
            drop(stdin);
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{} output:\n{}", self.tool_name(), stdout.trim_end());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostics = if stderr.trim().is_empty() {
                stdout.trim_end().to_string()
            } else {
                stderr.trim_end().to_string()
            };
            return Err(Error::ToolFailed {
                tool: self.tool_name(),
                code: output.status.code(),
                stderr: diagnostics,
            });
        }

        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_zero_exit_is_a_tool_failure_with_stderr() {
        let err = ToolCommand::new("sh")
            .args(["-c", "echo boom >&2; exit 3"])
            .run()
            .await
            .unwrap_err();

        match err {
            Error::ToolFailed { tool, code, stderr } => {
                assert_eq!(tool, "sh");
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn stdin_script_reaches_the_tool() {
        let output = ToolCommand::new("sh")
            .args(["-c", "read a; read b; echo \"$a-$b\""])
            .stdin_script("first\nsecond\n")
            .run()
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "first-second");
    }

    #[tokio::test]
    async fn env_and_working_directory_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let output = ToolCommand::new("sh")
            .args(["-c", "echo \"$PACKAGER_TEST\" > marker"])
            .env("PACKAGER_TEST", "hello")
            .current_dir(dir.path())
            .run()
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("marker")).unwrap().trim(),
            "hello"
        );
    }

    #[tokio::test]
    async fn missing_program_is_a_command_failure() {
        let err = ToolCommand::new("pwa-packager-no-such-tool")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }

    #[test]
    fn secret_arguments_are_masked() {
        let cmd = ToolCommand::new("/usr/bin/keytool")
            .arg("-storepass")
            .secret_arg("hunter2")
            .arg("-v");
        assert_eq!(cmd.display(), "/usr/bin/keytool -storepass ****** -v");
        assert_eq!(cmd.tool_name(), "keytool");
    }
}
