use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the managed service is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Running,
    Stopped,
    #[default]
    Unknown,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Running => "running",
            Status::Stopped => "stopped",
            Status::Unknown => "unknown",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Status::Running => "Running",
            Status::Stopped => "Stopped",
            Status::Unknown => "Unknown",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Status::Running)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One entry of `services info --json`. Every other field is ignored.
#[derive(Debug, Deserialize)]
struct ServiceInfo {
    running: bool,
}

/// Parse the output of `services info <name> --json`.
///
/// Only the first array element is consulted. On failure the returned string
/// describes why; the caller attaches the raw output.
pub fn parse_status(output: &str) -> Result<Status, String> {
    let output = output.trim();
    if output.is_empty() {
        return Err("empty output".into());
    }

    let entries: Vec<ServiceInfo> =
        serde_json::from_str(output).map_err(|e| format!("malformed JSON: {e}"))?;

    match entries.first() {
        Some(info) if info.running => Ok(Status::Running),
        Some(_) => Ok(Status::Stopped),
        None => Err("no service entry in output".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running() {
        assert_eq!(parse_status(r#"[{"running":true}]"#), Ok(Status::Running));
    }

    #[test]
    fn test_stopped() {
        assert_eq!(parse_status(r#"[{"running":false}]"#), Ok(Status::Stopped));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let out = r#"[{"name":"postgresql@14","service_name":"homebrew.mxcl.postgresql@14",
            "running":true,"loaded":true,"pid":4242,"user":"dev","status":"started"}]"#;
        assert_eq!(parse_status(out), Ok(Status::Running));
    }

    #[test]
    fn test_first_entry_wins() {
        let out = r#"[{"running":false},{"running":true}]"#;
        assert_eq!(parse_status(out), Ok(Status::Stopped));
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(parse_status("\n  [{\"running\":true}]\n"), Ok(Status::Running));
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(parse_status(""), Err("empty output".to_string()));
        assert!(parse_status("   \n").is_err());
    }

    #[test]
    fn test_empty_array() {
        let err = parse_status("[]").unwrap_err();
        assert!(err.contains("no service entry"));
    }

    #[test]
    fn test_malformed() {
        let err = parse_status("{not json").unwrap_err();
        assert!(err.starts_with("malformed JSON"));
    }

    #[test]
    fn test_missing_running_field() {
        assert!(parse_status(r#"[{"name":"postgresql@14"}]"#).is_err());
        assert!(parse_status(r#"[{"running":"yes"}]"#).is_err());
    }

    #[test]
    fn test_object_instead_of_array() {
        assert!(parse_status(r#"{"running":true}"#).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Status::Running.label(), "running");
        assert_eq!(Status::Stopped.label(), "stopped");
        assert_eq!(Status::Unknown.label(), "unknown");
        assert_eq!(Status::default(), Status::Unknown);
        assert_eq!(Status::Stopped.to_string(), "Stopped");
        assert!(Status::Running.is_running());
        assert!(!Status::Unknown.is_running());
    }
}
