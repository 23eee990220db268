//! Subprocess collaborator used for backtick command substitution.

use std::io;
use std::process::{Command, Stdio};

/// Runs a command line and returns its captured standard output.
///
/// The call blocks until the process exits and its output is fully drained;
/// the tokenizer resumes only after the runner returns.
pub trait CommandRunner {
    /// # Errors
    ///
    /// Returns an I/O error when the process cannot be spawned or its
    /// output cannot be read.
    fn run(&self, command: &str) -> io::Result<String>;
}

/// [`CommandRunner`] that hands the command line to the platform shell,
/// `/bin/sh -c` on unix and `cmd.exe /C` on windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> io::Result<String> {
        let output = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()?;

        log::debug!(
            "shell command {command:?} exited with {:?}",
            output.status.code()
        );

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd.exe");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn captures_stdout() {
        let out = ShellRunner.run("echo hello").expect("run echo");
        assert_eq!(out, "hello\n");
    }

    #[test]
    #[cfg(unix)]
    fn empty_output() {
        let out = ShellRunner.run("true").expect("run true");
        assert!(out.is_empty());
    }
}
