//! # svcpilot
//!
//! Start, stop and poll a single background service through a package
//! manager's service-control command (`brew services` by default).
//!
//! ## Quick Start
//!
//! ```no_run
//! use svcpilot::{ServiceSupervisor, Status, SupervisorConfig};
//!
//! # async fn example() -> svcpilot::Result<()> {
//! let sup = ServiceSupervisor::new(SupervisorConfig::default());
//!
//! sup.start().await?;
//! if sup.refresh().await? == Status::Running {
//!     println!("postgres is up");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **ServiceSupervisor** — runs `services start|stop|info` and caches the
//!   last parsed [`Status`]
//! - **CommandRunner** trait — how a command line is executed; [`ShellRunner`]
//!   goes through a login shell with stderr folded into stdout
//! - **AppState** — presentation state owned by the front-end, fed by
//!   [`SupervisorEvent`]s

pub mod app;
pub mod config;
pub mod error;
pub mod runner;
pub mod status;
pub mod supervisor;

pub use config::SupervisorConfig;
pub use error::{ErrorKind, Result, SupervisorError};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
pub use status::{parse_status, Status};
pub use supervisor::{Action, ActionReport, ServiceSupervisor, SupervisorEvent};
