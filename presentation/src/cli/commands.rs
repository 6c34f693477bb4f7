//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for reasoning results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every stage and response, then the summary
    Full,
    /// Only the closing summary
    Summary,
    /// The response envelope as JSON
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Summary => council_domain::OutputFormat::Summary,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "LLM Council - Multiple LLMs reason together over one question")]
#[command(long_about = r#"
LLM Council puts one question to several model providers and lets them
reason together under a fixed communication topology:

  debate  (complete-graph)  everyone sees everyone's earlier responses
  memory  (bus)             everyone reads a compacted shared pool
  report  (star)            peripherals report to a center, guidance flows back
  relay   (ring)            each sees only its predecessor, then all verify

The first participant writes the closing summary.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables      e.g. COUNCIL_ENGINE__INVOCATION_TIMEOUT_SECS=30
2. --config <path>                      Explicit config file
3. ./council.toml                       Project-level config
4. ~/.config/llm-council/config.toml    Global config

Example:
  council "Is remote work beneficial?"
  council -p openai,anthropic,gemini -s relay "Design a rate limiter"
  council --dry-run --stream -s star "What is a monad?"
"#)]
pub struct Cli {
    /// The question to put to the council
    pub question: Option<String>,

    /// Participants (repeatable or comma-separated)
    #[arg(short, long, value_name = "NAME", value_delimiter = ',')]
    pub participants: Vec<String>,

    /// Strategy: debate, memory, report, relay (or their topology names)
    #[arg(short, long, value_name = "STRATEGY")]
    pub strategy: Option<String>,

    /// Persona for a participant, as NAME=PERSONA (repeatable)
    #[arg(long, value_name = "NAME=PERSONA", value_parser = parse_persona)]
    pub persona: Vec<(String, String)>,

    /// Sampling temperature passed to every call (0..=2)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens per call (1..=8192)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Nucleus sampling passed to every call (0..=1)
    #[arg(long)]
    pub top_p: Option<f32>,

    /// Output format (defaults to the configured format, then summary)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Register a streaming session and print its events as they happen
    #[arg(long)]
    pub stream: bool,

    /// Answer with offline echo gateways instead of calling providers
    #[arg(long)]
    pub dry_run: bool,

    /// Check the health of every configured participant and exit
    #[arg(long)]
    pub health: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

fn parse_persona(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, persona)) if !name.trim().is_empty() && !persona.trim().is_empty() => {
            Ok((name.trim().to_string(), persona.trim().to_string()))
        }
        _ => Err(format!("expected NAME=PERSONA, got '{}'", raw)),
    }
}
