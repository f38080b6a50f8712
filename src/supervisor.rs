use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex};

use crate::config::SupervisorConfig;
use crate::error::{Result, SupervisorError};
use crate::runner::{command_line, CommandRunner, ShellRunner};
use crate::status::{parse_status, Status};

/// A state-changing service-manager subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
}

impl Action {
    pub fn subcommand(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subcommand())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// A refresh finished; `status` is the new cached value.
    Refreshed { status: Status },
    /// An operation failed. `message` is the diagnostic to show the user.
    Failed { message: String },
}

/// Outcome of [`ServiceSupervisor::perform`]: the action and the refresh that
/// always follows it.
#[derive(Debug)]
pub struct ActionReport {
    pub action: Action,
    pub action_result: Result<()>,
    pub status: Result<Status>,
}

impl ActionReport {
    /// Every failure in the order it happened: the action's, then the
    /// refresh's.
    pub fn into_errors(self) -> Vec<SupervisorError> {
        [self.action_result.err(), self.status.err()]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Starts, stops and queries one service through the service manager.
///
/// Holds only the cached [`Status`]. Every call runs one subprocess and waits
/// for it. Refreshes are serialized on `refresh_lock`; reading the cache never
/// waits on a refresh in flight.
pub struct ServiceSupervisor {
    config: SupervisorConfig,
    runner: Arc<dyn CommandRunner>,
    refresh_lock: Mutex<()>,
    cached: watch::Sender<Status>,
    events: broadcast::Sender<SupervisorEvent>,
}

impl ServiceSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        let runner = ShellRunner::new(config.shell_path.clone(), config.login_shell);
        Self::with_runner(config, Arc::new(runner))
    }

    pub fn with_runner(config: SupervisorConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            config,
            runner,
            refresh_lock: Mutex::new(()),
            cached: watch::Sender::new(Status::Unknown),
            events,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SupervisorEvent> {
        self.events.subscribe()
    }

    /// Last refreshed status, without running anything.
    pub fn status(&self) -> Status {
        *self.cached.borrow()
    }

    pub async fn start(&self) -> Result<()> {
        self.run_action(Action::Start).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.run_action(Action::Stop).await
    }

    /// Query the service manager and replace the cached status.
    ///
    /// Any failure resets the cache to [`Status::Unknown`].
    pub async fn refresh(&self) -> Result<Status> {
        let _guard = self.refresh_lock.lock().await;
        let name = self.config.service_name.as_str();
        let line = self.command_line(&["services", "info", name, "--json"]);

        let result = match self.runner.run(&line).await {
            Ok(out) => parse_status(&out.text).map_err(|reason| SupervisorError::Parse {
                command: line.clone(),
                output: out.text,
                reason,
            }),
            Err(e) => Err(e),
        };

        match result {
            Ok(status) => {
                tracing::info!("[{}] {}", self.config.service_name, status.label());
                self.cached.send_replace(status);
                self.emit(SupervisorEvent::Refreshed { status });
                Ok(status)
            }
            Err(e) => {
                tracing::warn!("[{}] refresh failed: {e}", self.config.service_name);
                if let Some(reason) = e.parse_reason() {
                    tracing::debug!("[{}] {reason}", self.config.service_name);
                }
                self.cached.send_replace(Status::Unknown);
                self.emit(SupervisorEvent::Refreshed {
                    status: Status::Unknown,
                });
                self.emit(SupervisorEvent::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Run `action`, then refresh regardless of whether it succeeded.
    pub async fn perform(&self, action: Action) -> ActionReport {
        let action_result = self.run_action(action).await;
        let status = self.refresh().await;
        ActionReport {
            action,
            action_result,
            status,
        }
    }

    async fn run_action(&self, action: Action) -> Result<()> {
        let name = self.config.service_name.as_str();
        let line = self.command_line(&["services", action.subcommand(), name]);
        tracing::info!("[{}] {action}", self.config.service_name);

        let result = match self.runner.run(&line).await {
            Ok(out) if out.text.is_empty() => Err(SupervisorError::EmptyOutput { command: line }),
            Ok(out) => {
                tracing::debug!("[{}] {}", self.config.service_name, out.text);
                Ok(())
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::warn!("[{}] {action} failed: {e}", self.config.service_name);
            self.emit(SupervisorEvent::Failed {
                message: e.to_string(),
            });
        }
        result
    }

    fn command_line(&self, args: &[&str]) -> String {
        command_line(&self.config.command_path, args)
    }

    fn emit(&self, event: SupervisorEvent) {
        let _ = self.events.send(event);
    }
}
