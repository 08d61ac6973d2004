use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod ascii_charts;
mod cli_output;
mod client;
mod config;
mod models;
mod normalize;
mod session;
mod tui;
mod view_model;

use cli_output::{OutputMode, OutputWriter};
use client::AnalysisClient;
use session::Session;

#[derive(Parser)]
#[command(name = "ghcareer")]
#[command(about = "Analyze a GitHub profile and render the results as a dashboard", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base URL of the analysis backend (e.g. http://localhost:8000/api/v1)
    #[arg(long, global = true, env = config::BACKEND_URL_ENV)]
    backend_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a profile and print the dashboard
    Analyze {
        /// GitHub username or profile URL
        input: String,

        /// Output format (default: auto-detect)
        #[arg(short, long, value_enum)]
        format: Option<OutputMode>,
    },

    /// Interactive TUI dashboard
    Tui {
        /// Username or profile URL to analyze right away
        input: Option<String>,
    },

    /// Check that the analysis backend is reachable
    Health,

    /// Show or change the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the resolved configuration
    Show,
    /// Store the backend base URL
    Set {
        /// Base URL of the analysis backend
        backend_url: String,
    },
}

fn resolve_client(cli_backend_url: Option<&str>) -> Result<AnalysisClient> {
    let settings = config::resolve(cli_backend_url, &config::config_file_path()?)?;
    info!(
        "Using backend {} (from {})",
        settings.backend_url,
        settings.source.name()
    );
    Ok(AnalysisClient::new(settings.backend_url))
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// One-shot lookup; a failed session is reported, then returned as an error
async fn analyze(client: &AnalysisClient, input: &str, out: &OutputWriter) -> Result<()> {
    let mut session = Session::new();
    let Some(ticket) = session.submit(input) else {
        bail!("Enter a GitHub username or profile URL");
    };
    let handle = ticket.handle().to_string();
    info!("🔍 Analyzing {}...", handle);

    let pb = out
        .is_human()
        .then(|| spinner(format!("Analyzing {}...", handle)));
    let outcome = client.fetch_analysis(&handle).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    session.complete(ticket, outcome);

    if let (Some(record), Some(view)) = (session.record(), session.view_model()) {
        out.dashboard(record, &view)?;
        return Ok(());
    }

    let message = session
        .error_message()
        .unwrap_or(session::GENERIC_FAILURE_MESSAGE);
    out.error(message);
    bail!("Analysis of {} failed", handle)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; keep the TUI's alternate screen clean unless asked
    let level = match (&cli.command, cli.verbose) {
        (_, true) => Level::DEBUG,
        (Commands::Tui { .. }, false) => Level::WARN,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Analyze { input, format } => {
            let client = resolve_client(cli.backend_url.as_deref())?;
            let out = OutputWriter::new(format.unwrap_or_else(OutputMode::auto));
            analyze(&client, &input, &out).await
        }

        Commands::Tui { input } => {
            let client = resolve_client(cli.backend_url.as_deref())?;
            tui::run_tui(client, input)
        }

        Commands::Health => {
            let client = resolve_client(cli.backend_url.as_deref())?;
            let out = OutputWriter::new(OutputMode::auto());

            match client.check_health().await {
                Ok(health) if health.is_ok() => {
                    out.success(&format!(
                        "Backend healthy: {} ({})",
                        client.health_url(),
                        health.project
                    ));
                    Ok(())
                }
                Ok(health) => {
                    out.error(&format!("Backend reported status {:?}", health.status));
                    bail!("Backend at {} is unhealthy", client.health_url())
                }
                Err(e) => {
                    out.error(&format!("Health check failed: {}", e));
                    Err(anyhow!(e).context(format!("Backend at {} is unreachable", client.health_url())))
                }
            }
        }

        Commands::Config { action } => {
            let path = config::config_file_path()?;
            let out = OutputWriter::new(OutputMode::auto());

            match action {
                ConfigAction::Show => {
                    let resolved = config::resolve(cli.backend_url.as_deref(), &path);
                    let (backend, source) = match &resolved {
                        Ok(settings) => (
                            settings.backend_url.to_string(),
                            settings.source.name().to_string(),
                        ),
                        Err(e) => (format!("not set ({})", e), "-".to_string()),
                    };
                    out.table(&[
                        ("Backend URL", backend),
                        ("Source", source),
                        ("Config file", path.display().to_string()),
                    ]);
                    Ok(())
                }
                ConfigAction::Set { backend_url } => {
                    let url = config::set_backend_url(&backend_url, &path)?;
                    out.success(&format!("Backend URL set to {} in {}", url, path.display()));
                    Ok(())
                }
            }
        }
    }
}
