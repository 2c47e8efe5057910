//! CLI entrypoint for Consult Quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use consult_application::{
    ConsultationOrchestrator, ConversationLogger, NoConversationLogger, NoProgress,
    ProgressNotifier,
};
use consult_infrastructure::{ConfigLoader, ConfiguredInvoker, JsonlConversationLogger};
use consult_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    // Initialize logging based on verbosity level
    let filter = match (&config.logging.filter, cli.verbose) {
        (Some(directive), _) => EnvFilter::new(directive),
        (None, 0) => EnvFilter::new("warn"),
        (None, 1) => EnvFilter::new("info"),
        (None, 2) => EnvFilter::new("debug"),
        (None, _) => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Consult Quorum");

    let Some(question) = cli.question.clone() else {
        bail!("A question is required. Run with --help for usage.");
    };

    let config = ConfigLoader::ensure_valid(config)?;
    let panel = cli.apply_panel_overrides(config.to_panel()?)?;
    let settings = cli.apply_settings_overrides(config.to_settings()?)?;

    // === Dependency Injection ===
    let invoker = Arc::new(
        ConfiguredInvoker::from_config(&config.invoker).context("Failed to set up agent invoker")?,
    );

    let log_path = cli
        .conversation_log
        .clone()
        .or_else(|| config.logging.conversation_log.clone());
    let conversation_logger: Arc<dyn ConversationLogger> = match log_path {
        Some(path) => match JsonlConversationLogger::open(&path) {
            Ok(logger) => {
                info!("Logging consultation events to {}", path.display());
                Arc::new(logger)
            }
            Err(e) => {
                warn!("Could not open conversation log {}: {}", path.display(), e);
                Arc::new(NoConversationLogger)
            }
        },
        None => Arc::new(NoConversationLogger),
    };

    // Ctrl-C ends the consultation like the deadline does
    let cancellation = CancellationToken::new();
    {
        let token = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    if !cli.quiet {
        println!();
        println!("+============================================================+");
        println!("|           Consult Quorum - Expert Panel                    |");
        println!("+============================================================+");
        println!();
        println!("Question: {}", question);
        println!(
            "Panel: {}",
            panel
                .agents()
                .iter()
                .map(|a| format!("{} ({})", a.id, a.role))
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    }

    let orchestrator = ConsultationOrchestrator::new(invoker, settings)
        .with_conversation_logger(conversation_logger)
        .with_cancellation(cancellation);

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let result = orchestrator
        .orchestrate_with_progress(&question, &panel, &cli.history_entries(), progress.as_ref())
        .await?;

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&result),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };

    println!("{}", output);

    Ok(())
}
