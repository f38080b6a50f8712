use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use svcpilot::app::{parse_request, status_label, AppState, Request};
use svcpilot::config::{self, SupervisorConfig};
use svcpilot::{Action, Result, ServiceSupervisor, SupervisorError, SupervisorEvent};

#[derive(Parser)]
#[command(
    name = "svcpilot",
    about = "svcpilot — start, stop and check a package-manager service"
)]
struct Cli {
    /// Path to svcpilot.hcl (default: user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the service, then show its status
    Start,
    /// Stop the service, then show its status
    Stop,
    /// Query and show the service status
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Prompt for start/stop/refresh until quit (default)
    Interactive,
    /// Write a svcpilot.hcl template
    Init,
    /// Validate the configuration without running anything
    Validate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let path = cli.config.clone().unwrap_or_else(config::default_path);
    let log_level = std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| hcl::from_str::<SupervisorConfig>(&s).ok())
        .map(|c| c.log_level)
        .unwrap_or_else(|| "warn".into());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    if let Err(e) = run(cli).await {
        report_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Init => {
            let path = cli.config.unwrap_or_else(config::default_path);
            if path.exists() {
                return Err(SupervisorError::Config(format!(
                    "{} already exists — delete it first or use a different path",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, config::INIT_TEMPLATE)?;
            println!("{} created {}", "✓".green(), path.display().to_string().cyan());
            println!("  edit it, then run {} to check the service", "svcpilot status".cyan());
        }

        Commands::Validate => {
            let cfg = SupervisorConfig::load(cli.config.as_deref())?;
            println!("{} configuration is valid", "✓".green());
            println!("  service  {}", cfg.service_name.cyan());
            println!("  manager  {}", cfg.command_path);
            let login = if cfg.login_shell { " (login)" } else { "" };
            println!("  shell    {}{}", cfg.shell_path, login.dimmed());
        }

        Commands::Status { json } => {
            let sup = ServiceSupervisor::new(SupervisorConfig::load(cli.config.as_deref())?);
            let result = sup.refresh().await;
            let status = sup.status();
            if json {
                let body = serde_json::json!({
                    "service": sup.config().service_name,
                    "status": status,
                });
                println!("{body}");
            } else {
                print_status(&sup.config().service_name, status);
            }
            result?;
        }

        Commands::Start => perform(cli.config, Action::Start).await?,
        Commands::Stop => perform(cli.config, Action::Stop).await?,

        Commands::Interactive => {
            let sup = Arc::new(ServiceSupervisor::new(SupervisorConfig::load(
                cli.config.as_deref(),
            )?));
            interactive(sup).await?;
        }
    }

    Ok(())
}

async fn perform(config: Option<PathBuf>, action: Action) -> Result<()> {
    let sup = ServiceSupervisor::new(SupervisorConfig::load(config.as_deref())?);
    let report = sup.perform(action).await;
    print_status(&sup.config().service_name, sup.status());

    // The last failure is returned to `main`; any earlier one is shown here.
    let mut errors = report.into_errors();
    let last = errors.pop();
    for e in &errors {
        report_error(e);
    }
    match last {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_status(service: &str, status: svcpilot::Status) {
    println!("{} {}", format!("{service}:").bold(), status_label(status));
}

fn report_error(message: &dyn std::fmt::Display) {
    eprintln!("{} {message}", "[svcpilot]".red().bold());
}

/// Presentation loop: requests run on background tasks, results come back as
/// supervisor events and are folded into `AppState`.
async fn interactive(sup: Arc<ServiceSupervisor>) -> Result<()> {
    let service = sup.config().service_name.clone();
    let mut events = sup.subscribe();
    let mut state = AppState::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{} {}", service.cyan().bold(), "status".bold());
    println!(
        "{}",
        "[s]tart  [x] stop  [r]efresh (enter)  [q]uit".dimmed()
    );

    state.begin();
    dispatch(&sup, Request::Refresh);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_request(&line) {
                    Some(Request::Quit) => break,
                    Some(req) => {
                        if state.begin() {
                            dispatch(&sup, req);
                        } else {
                            println!("{} busy, try again shortly", "·".dimmed());
                        }
                    }
                    None => println!("{} unknown command '{}'", "·".dimmed(), line.trim()),
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        state.apply(&event);
                        if let SupervisorEvent::Refreshed { status } = event {
                            print_status(&service, status);
                        }
                        if let Some(message) = state.take_error() {
                            report_error(&message);
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::debug!("dropped {n} supervisor events");
                        state.resync(sup.status());
                        print_status(&service, state.status);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}

fn dispatch(sup: &Arc<ServiceSupervisor>, req: Request) {
    let sup = sup.clone();
    tokio::spawn(async move {
        match req {
            Request::Refresh => {
                let _ = sup.refresh().await;
            }
            Request::Perform(action) => {
                sup.perform(action).await;
            }
            Request::Quit => {}
        }
    });
}
