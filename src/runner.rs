use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Result, SupervisorError};

/// Shell exit codes for "found but not executable" and "not found".
const EXIT_NOT_EXECUTABLE: i32 = 126;
const EXIT_NOT_FOUND: i32 = 127;

/// Combined stdout/stderr of one finished command, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: Option<i32>,
}

/// Runs one command line to completion and captures everything it printed.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command_line: &str) -> Result<CommandOutput>;
}

/// Runs command lines through `<shell> [-l] -c`, with stderr folded into stdout.
pub struct ShellRunner {
    shell_path: String,
    login: bool,
}

impl ShellRunner {
    pub fn new(shell_path: impl Into<String>, login: bool) -> Self {
        Self {
            shell_path: shell_path.into(),
            login,
        }
    }

    fn shell_args(&self, command_line: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(3);
        if self.login {
            args.push("-l".to_string());
        }
        args.push("-c".to_string());
        args.push(format!("{command_line} 2>&1"));
        args
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str) -> Result<CommandOutput> {
        tracing::debug!(shell = %self.shell_path, "running: {command_line}");

        // No timeout: a hung service manager hangs the caller.
        let out = Command::new(&self.shell_path)
            .args(self.shell_args(command_line))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SupervisorError::Launch {
                command: command_line.to_string(),
                reason: format!("{}: {e}", self.shell_path),
            })?;

        let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&out.stderr));
        let text = text.trim().to_string();
        let exit_code = out.status.code();

        tracing::debug!(?exit_code, bytes = text.len(), "finished: {command_line}");

        if matches!(exit_code, Some(EXIT_NOT_FOUND) | Some(EXIT_NOT_EXECUTABLE)) {
            return Err(SupervisorError::Launch {
                command: command_line.to_string(),
                reason: if text.is_empty() {
                    format!("shell exited with status {}", exit_code.unwrap_or_default())
                } else {
                    text
                },
            });
        }

        Ok(CommandOutput { text, exit_code })
    }
}

/// Join a program and its arguments into one shell command line, quoting
/// anything the shell would otherwise interpret.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+:,./_-".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
