use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SupervisorError};

pub const DEFAULT_COMMAND_PATH: &str = "/opt/homebrew/bin/brew";
pub const DEFAULT_SERVICE_NAME: &str = "postgresql@14";
pub const DEFAULT_SHELL_PATH: &str = "/bin/zsh";

/// Which service to manage and how to reach the service manager.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Path to the service-manager executable.
    pub command_path: String,
    pub service_name: String,
    /// Shell used to run every command, so user PATH additions apply.
    pub shell_path: String,
    /// Pass `-l` to the shell.
    pub login_shell: bool,
    pub log_level: String,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            command_path: DEFAULT_COMMAND_PATH.into(),
            service_name: DEFAULT_SERVICE_NAME.into(),
            shell_path: DEFAULT_SHELL_PATH.into(),
            login_shell: true,
            log_level: "warn".into(),
        }
    }
}

/// `~/.config/svcpilot/svcpilot.hcl` (platform equivalent).
pub fn default_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("svcpilot")
        .join("svcpilot.hcl")
}

impl SupervisorConfig {
    pub fn parse(src: &str) -> Result<Self> {
        let cfg: SupervisorConfig =
            hcl::from_str(src).map_err(|e| SupervisorError::Config(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|e| {
            SupervisorError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&src).map_err(|e| match e {
            SupervisorError::Config(msg) => {
                SupervisorError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Load an explicitly named file, or the default path if it exists.
    /// Falls back to built-in defaults when no file is given and none exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let p = default_path();
                if p.exists() {
                    Self::from_file(&p)
                } else {
                    tracing::debug!("no config at {}, using defaults", p.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.command_path.trim().is_empty() {
            return Err(SupervisorError::Config("command_path must not be empty".into()));
        }
        if self.shell_path.trim().is_empty() {
            return Err(SupervisorError::Config("shell_path must not be empty".into()));
        }
        if self.service_name.trim().is_empty() {
            return Err(SupervisorError::Config("service_name must not be empty".into()));
        }
        if self.service_name.chars().any(char::is_whitespace) {
            return Err(SupervisorError::Config(format!(
                "service_name '{}' must not contain whitespace",
                self.service_name
            )));
        }
        if !Path::new(&self.command_path).is_absolute() {
            tracing::warn!(
                "command_path '{}' is not absolute; relying on the shell's PATH",
                self.command_path
            );
        }
        Ok(())
    }
}

pub const INIT_TEMPLATE: &str = r#"# svcpilot.hcl — generated by `svcpilot init`
# Run `svcpilot status` to check the service, `svcpilot validate` to check config.

# Service-manager executable. Commands run as:
#   <command_path> services start|stop <service_name>
#   <command_path> services info <service_name> --json
command_path = "/opt/homebrew/bin/brew"
service_name = "postgresql@14"

# Every command goes through this shell so profile PATH additions apply.
shell_path  = "/bin/zsh"
login_shell = true

# Overridden by RUST_LOG when set.
log_level = "warn"
"#;
