//! CLI command definitions

use clap::{Parser, ValueEnum};
use council_domain::OutputFormat as DomainOutputFormat;
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer, rationale and the per-agent trace
    Full,
    /// Only the reconciled answer
    Content,
    /// The whole result as JSON
    Json,
}

impl From<OutputFormat> for DomainOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => DomainOutputFormat::Full,
            OutputFormat::Content => DomainOutputFormat::Content,
            OutputFormat::Json => DomainOutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "LLM Council - several LLMs answer together under a deadline and a budget")]
#[command(long_about = r#"
llm-council poses one prompt to a council of LLM agents and reconciles their
answers under a collaboration mode:

  round_table                 draft, critique, vote, synthesize
  sequential_critique_chain   each agent amends the previous version
  validated_consensus         co-draft, verify claims, rewrite once if needed
  creative_brainstorm_swarm   ideate, fuse, vote, expand
  hybrid_guarded_braintrust   ideate, rank, verify survivors, elaborate

Agents are given as provider:model. The offline `scripted` provider needs no
credentials (models: any name, `slow`, `flaky`, `fail`).

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./council.toml      Project-level config
3. ~/.config/llm-council/config.toml   Global config

Example:
  llm-council -a scripted:alpha -a scripted:beta -a scripted:gamma "Why is the sky blue?"
  llm-council --mode validated_consensus -a openai:gpt-4o-mini -a openrouter:meta-llama/llama-3-70b "..."
"#)]
pub struct Cli {
    /// The prompt to pose to the council
    pub prompt: Option<String>,

    /// Collaboration mode
    #[arg(short, long, value_name = "MODE", default_value = "round_table")]
    pub mode: String,

    /// Agents as provider:model (can be specified multiple times; replaces configured agents)
    #[arg(short, long = "agent", value_name = "PROVIDER:MODEL")]
    pub agents: Vec<String>,

    /// Upper bound on total spend for the session
    #[arg(long, value_name = "AMOUNT")]
    pub cost_cap: Option<f64>,

    /// Global session timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Quorum rule: majority, unanimous, atleast:N or N%
    #[arg(long, value_name = "RULE")]
    pub quorum: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Append progress events as JSONL to this file
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Write tracing logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
