//! CLI argument parsing with subcommand architecture.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ecolens", version, about = "Product sustainability analyzer backed by an LLM completion API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default when no subcommand is given)
    Run(RunArgs),
    /// Analyze one product from the command line and print the JSON result
    Analyze(AnalyzeArgs),
    /// List the prompt profiles available with the current config
    Profiles(CommonArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to config file
    #[arg(short, long, default_value = "config.yaml", env = "ECOLENS_CONFIG")]
    pub config: String,

    /// Log level
    #[arg(long, default_value = "info", env = "ECOLENS_LOG_LEVEL")]
    pub log_level: String,

    /// Completion API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Listen host
    #[arg(long, env = "ECOLENS_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "ECOLENS_PORT")]
    pub port: Option<u16>,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Product name
    #[arg(long)]
    pub product: String,

    /// Description or ingredient list
    #[arg(long)]
    pub ingredients: String,

    /// Prompt profile (defaults to the config's default-profile)
    #[arg(long)]
    pub profile: Option<String>,
}
