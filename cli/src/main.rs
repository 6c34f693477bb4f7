//! CLI entrypoint for LLM Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::ports::model_gateway::GatewayRegistry;
use council_application::{
    ReasoningResponse, RolePrefix, RunReasoningUseCase, StreamOutcome, StreamReasoningUseCase,
};
use council_domain::{GenerationOptions, OutputFormat, ReasoningInput, ReasoningResult};
use council_infrastructure::{ConfigLoader, FileConfig, GatewayFactory};
use council_presentation::{Cli, ConsoleFormatter, OutputFormatter, ProgressReporter, sse_frame};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    info!("Starting LLM Council");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = load_config(&cli)?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let registry = GatewayFactory::new()
        .dry_run(cli.dry_run)
        .build(&config)
        .context("failed to build provider gateways")?;

    if cli.health {
        return health(&registry).await;
    }

    let Some(question) = cli.question.clone() else {
        bail!("A question is required. Run with --help for usage.");
    };
    let input = build_input(&cli, &config, question);

    let mut engine = RunReasoningUseCase::new(registry, config.to_engine_config());
    if !cli.persona.is_empty() {
        engine = engine.with_persona_decorator(Arc::new(RolePrefix));
    }

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    if cli.stream {
        stream(engine, input).await
    } else {
        batch(&cli, &engine, input, format).await
    }
}

/// Install the tracing subscriber on stderr, or on `--log-file`
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &cli.log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    if let Some(path) = &cli.config
        && !path.exists()
    {
        bail!("config file not found: {}", path.display());
    }

    let config = ConfigLoader::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;
    for issue in config.check()? {
        warn!("{}", issue);
    }
    Ok(config)
}

fn build_input(cli: &Cli, config: &FileConfig, question: String) -> ReasoningInput {
    let participants = if cli.participants.is_empty() {
        config.defaults.participants.clone()
    } else {
        cli.participants.clone()
    };
    let strategy = cli
        .strategy
        .clone()
        .unwrap_or_else(|| config.defaults.strategy.clone());

    let mut input = ReasoningInput::new(question, participants, strategy);
    if cli.temperature.is_some() || cli.max_tokens.is_some() || cli.top_p.is_some() {
        input = input.with_options(GenerationOptions {
            temperature: cli.temperature,
            max_tokens: cli.max_tokens,
            top_p: cli.top_p,
        });
    }
    for (participant, persona) in &cli.persona {
        input = input.with_persona(participant, persona);
    }
    input
}

async fn batch(
    cli: &Cli,
    engine: &RunReasoningUseCase,
    input: ReasoningInput,
    format: OutputFormat,
) -> Result<()> {
    let outcome = if cli.quiet || format == OutputFormat::Json {
        engine.execute(input).await
    } else {
        let progress = ProgressReporter::new();
        engine.execute_with_progress(input, &progress).await
    };

    match outcome {
        Ok(result) => {
            print_result(format, result);
            Ok(())
        }
        Err(e) if format == OutputFormat::Json => {
            let code = e.code();
            let response = ReasoningResponse::from(Err::<ReasoningResult, _>(e));
            println!("{}", ConsoleFormatter::format_json(&response));
            bail!("request failed with {}", code)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_result(format: OutputFormat, result: ReasoningResult) {
    println!("{}", ConsoleFormatter.render(format, result));
}

/// Register a session, attach to it and print every event as a frame
async fn stream(engine: RunReasoningUseCase, input: ReasoningInput) -> Result<()> {
    let streaming = StreamReasoningUseCase::new(Arc::new(engine));
    let shutdown = CancellationToken::new();
    let sweeper = streaming.spawn_sweeper(shutdown.clone());

    let session_id = streaming.register(input)?;
    info!("Registered streaming session {}", session_id);
    let mut subscription = streaming.attach(&session_id)?;

    let stdout = std::io::stdout();
    while let Some(event) = subscription.events.recv().await {
        let mut out = stdout.lock();
        out.write_all(sse_frame(&event).as_bytes())?;
        out.flush()?;
    }

    let outcome = subscription
        .outcome
        .await
        .context("streaming run panicked")?;
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        warn!("Session sweeper ended abnormally: {}", e);
    }

    match outcome {
        StreamOutcome::Completed(result) => {
            info!(
                "Session {} completed in {} ms",
                session_id, result.duration_ms
            );
            Ok(())
        }
        StreamOutcome::DeadlineExceeded { closed_stages } => bail!(
            "request deadline exceeded after {} closed stage(s)",
            closed_stages.len()
        ),
    }
}

/// Print the health of every registered participant
async fn health(registry: &GatewayRegistry) -> Result<()> {
    use colored::Colorize;

    let mut unhealthy = 0;
    for participant in registry.participants() {
        let Some(gateway) = registry.get(&participant) else {
            continue;
        };
        if gateway.health_check().await {
            println!("  {} {}", "v".green(), participant);
        } else {
            unhealthy += 1;
            let reason = if gateway.is_available() {
                "unreachable"
            } else {
                "no API key"
            };
            println!("  {} {} ({})", "x".red(), participant, reason);
        }
    }

    if unhealthy == registry.len() {
        bail!("no participant is healthy");
    }
    Ok(())
}
