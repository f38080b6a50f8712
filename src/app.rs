//! Presentation state for the terminal front-end.
//!
//! The supervisor knows nothing about this module: the front-end owns an
//! [`AppState`], feeds it [`SupervisorEvent`]s and renders from it.

use colored::{ColoredString, Colorize};

use crate::status::Status;
use crate::supervisor::{Action, SupervisorEvent};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppState {
    pub status: Status,
    /// An operation is in flight; new requests are refused until it settles.
    pub loading: bool,
    /// Pending error notification, cleared once shown.
    pub last_error: Option<String>,
}

impl AppState {
    /// Mark an operation as started. Returns false if one is already running.
    pub fn begin(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn apply(&mut self, event: &SupervisorEvent) {
        match event {
            SupervisorEvent::Refreshed { status } => {
                self.status = *status;
                self.loading = false;
            }
            SupervisorEvent::Failed { message } => {
                self.last_error = Some(message.clone());
            }
        }
    }

    /// Recover after missed events: adopt the supervisor's cached status and
    /// stop waiting for a `Refreshed` that may have been dropped.
    pub fn resync(&mut self, status: Status) {
        self.status = status;
        self.loading = false;
    }

    /// Take the pending notification, dismissing it.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }
}

/// A request typed at the interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Perform(Action),
    Refresh,
    Quit,
}

/// `s` start, `x` stop, `r` or an empty line refresh, `q` quit.
pub fn parse_request(line: &str) -> Option<Request> {
    match line.trim().to_lowercase().as_str() {
        "" | "r" | "refresh" => Some(Request::Refresh),
        "s" | "start" => Some(Request::Perform(Action::Start)),
        "x" | "stop" => Some(Request::Perform(Action::Stop)),
        "q" | "quit" | "exit" => Some(Request::Quit),
        _ => None,
    }
}

/// Green when running, red otherwise.
pub fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Running => status.title().green().bold(),
        _ => status.title().red().bold(),
    }
}
