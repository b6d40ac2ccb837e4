//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    EventPublisher, FanoutPublisher, NoEvents, SessionCoordinator, SessionRequest,
};
use council_domain::FinalStatus;
use council_infrastructure::{ConfigLoader, FileAgentConfig, FileConfig, JsonlEventLog, build_roster};
use council_presentation::{Cli, ConsoleFormatter, OutputConfig, OutputFormatter, ProgressReporter};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli);

    if cli.show_config {
        println!("Configuration sources (lowest to highest priority):");
        for source in ConfigLoader::describe_sources() {
            println!("  {}", source);
        }
        return Ok(ExitCode::SUCCESS);
    }

    info!("Starting llm-council");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    apply_cli_overrides(&mut config, &cli);

    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("config error: {}", error);
        }
        bail!("invalid configuration ({} errors)", errors.len());
    }

    let output = OutputConfig::from_file(
        config.output.format,
        config.output.color,
        config.output.show_progress,
    )
    .with_cli(&cli);
    if !output.color {
        colored::control::set_override(false);
    }

    let Some(prompt) = cli.prompt.clone() else {
        bail!("a prompt is required (see --help)");
    };
    if config.agents.is_empty() {
        bail!("no agents configured; pass --agent provider:model or add [[agents]] to the config");
    }

    // === Dependency Injection ===
    let agents = build_roster(&config.agents)?;
    let publisher = build_publisher(&cli, &output);
    let coordinator =
        SessionCoordinator::new(config.orchestration.to_params()).with_publisher(publisher);

    let mut request = SessionRequest::new(prompt, cli.mode.clone(), agents);
    if let Some(cap) = cli.cost_cap {
        request = request.with_cost_cap(cap);
    }

    // Ctrl-C aborts the session; completed phases are still reported
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, aborting session");
            on_interrupt.cancel();
        }
    });

    let result = coordinator.run_with_cancel(request, cancel).await?;

    print!("{}", ConsoleFormatter.render(&result, output.format));
    if output.format == council_domain::OutputFormat::Json {
        println!();
    }

    Ok(match result.status {
        FinalStatus::Completed => ExitCode::SUCCESS,
        FinalStatus::Partial | FinalStatus::Aborted => ExitCode::from(2),
    })
}

/// Install the tracing subscriber; the returned guard flushes the log file on drop
fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "llm-council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// Command-line flags take precedence over every config file
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.agents.is_empty() {
        config.agents = cli
            .agents
            .iter()
            .map(|spec| FileAgentConfig::parse(spec))
            .collect();
    }
    if let Some(quorum) = &cli.quorum {
        config.orchestration.quorum = quorum.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        config.orchestration.global_timeout_ms = ms;
    }
}

fn build_publisher(cli: &Cli, output: &OutputConfig) -> Arc<dyn EventPublisher> {
    let mut fanout = FanoutPublisher::default();

    if output.show_progress {
        fanout = fanout.with(Arc::new(ProgressReporter::new()));
    }

    if let Some(path) = &cli.event_log {
        match JsonlEventLog::new(path) {
            Some(log) => fanout = fanout.with(Arc::new(log)),
            None => warn!("Could not open event log {}", path.display()),
        }
    }

    if fanout.is_empty() {
        Arc::new(NoEvents)
    } else {
        Arc::new(fanout)
    }
}
