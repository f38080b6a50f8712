//! Error types for svcpilot

use thiserror::Error;

/// Errors surfaced by the supervisor and its configuration layer.
///
/// None of these are fatal: every supervisor operation resolves to either a
/// value or one of these, carrying the command that was run and whatever the
/// service manager printed.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The subprocess could not be started, or the shell could not find or
    /// execute the service manager.
    #[error("failed to launch '{command}': {reason}")]
    Launch { command: String, reason: String },

    /// The subprocess exited without printing anything.
    #[error("failed to run service manager command: {command}")]
    EmptyOutput { command: String },

    /// Output was empty, not JSON, or not the expected shape. `reason` says
    /// which; it is kept out of the message so every case reads the same.
    #[error("failed to parse JSON from service manager:\n{output}")]
    Parse {
        command: String,
        output: String,
        reason: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`SupervisorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LaunchFailure,
    EmptyOutput,
    ParseFailure,
    Config,
    Io,
}

impl SupervisorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SupervisorError::Launch { .. } => ErrorKind::LaunchFailure,
            SupervisorError::EmptyOutput { .. } => ErrorKind::EmptyOutput,
            SupervisorError::Parse { .. } => ErrorKind::ParseFailure,
            SupervisorError::Config(_) => ErrorKind::Config,
            SupervisorError::Io(_) => ErrorKind::Io,
        }
    }

    /// Text to show alongside the error: the service manager's raw output for
    /// parse failures, the shell or OS message for launch failures.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            SupervisorError::Parse { output, .. } => Some(output),
            SupervisorError::Launch { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Why parsing failed, e.g. no service entry vs malformed JSON.
    pub fn parse_reason(&self) -> Option<&str> {
        match self {
            SupervisorError::Parse { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Result type alias for supervisor operations
pub type Result<T> = std::result::Result<T, SupervisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let launch = SupervisorError::Launch {
            command: "brew services start x".into(),
            reason: "not found".into(),
        };
        assert_eq!(launch.kind(), ErrorKind::LaunchFailure);
        assert_eq!(launch.diagnostic(), Some("not found"));
        assert!(launch.parse_reason().is_none());

        let empty = SupervisorError::EmptyOutput {
            command: "brew services stop x".into(),
        };
        assert_eq!(empty.kind(), ErrorKind::EmptyOutput);

        let parse = SupervisorError::Parse {
            command: "brew services info x --json".into(),
            output: "[]".into(),
            reason: "no service entry".into(),
        };
        assert_eq!(parse.kind(), ErrorKind::ParseFailure);
        assert_eq!(parse.diagnostic(), Some("[]"));
        assert_eq!(parse.parse_reason(), Some("no service entry"));
    }

    #[test]
    fn test_display_carries_diagnostics() {
        let e = SupervisorError::Parse {
            command: "brew services info x --json".into(),
            output: "{not json".into(),
            reason: "malformed JSON".into(),
        };
        assert_eq!(
            e.to_string(),
            "failed to parse JSON from service manager:\n{not json"
        );

        let e = SupervisorError::EmptyOutput {
            command: "brew services start x".into(),
        };
        assert_eq!(
            e.to_string(),
            "failed to run service manager command: brew services start x"
        );
    }

    #[test]
    fn test_io_from() {
        let e: SupervisorError = std::io::Error::other("boom").into();
        assert_eq!(e.kind(), ErrorKind::Io);
        assert!(e.diagnostic().is_none());
    }
}
