//! Command-line interface module.
//!
//! This module defines the CLI structure using Clap, including
//! all commands, arguments, and options.
//!
//! # Commands
//!
//! - `parse`: Extract and analyze a Terraform configuration
//! - `explain`: Describe a configuration in plain language
//! - `serve`: Run the HTTP service
//! - `init`: Create an example configuration file
//! - `validate`: Validate a configuration file
//!
//! # Example Usage
//!
//! ```bash
//! # Analyze a file
//! infraexplain parse main.tf
//!
//! # Read from stdin and emit JSON
//! cat main.tf | infraexplain parse --format json
//!
//! # Fail CI on security findings
//! infraexplain parse main.tf --strict
//!
//! # Explain a configuration
//! infraexplain explain main.tf
//!
//! # Run the HTTP service
//! infraexplain serve --bind 127.0.0.1:8080
//! ```

use crate::types::ReportFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// InfraExplain - Terraform configuration analyzer and explainer.
#[derive(Parser, Debug)]
#[command(
    name = "infraexplain",
    author,
    version,
    about = "Terraform configuration analyzer and explainer",
    long_about = "InfraExplain extracts resources, variables and outputs from Terraform \
                  configuration, flags common security and configuration issues, and \
                  explains the result in plain language."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "INFRAEXPLAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and analyze a Terraform configuration
    #[command(visible_alias = "p")]
    Parse(ParseArgs),

    /// Explain a Terraform configuration in plain language
    #[command(visible_alias = "e")]
    Explain(ExplainArgs),

    /// Run the HTTP service
    Serve(ServeArgs),

    /// Create an example configuration file
    Init,

    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Options shared by commands that run the analyzer.
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Disable a rule by code (repeatable)
    #[arg(long = "disable-rule", value_name = "CODE")]
    pub disable_rules: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Emit compact JSON
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the parse command.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Terraform file to read (`-` for stdin)
    #[arg(value_name = "FILE", default_value = "-")]
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exit with code 1 when security findings exist
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Arguments for the explain command.
#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Terraform file to read (`-` for stdin)
    #[arg(value_name = "FILE", default_value = "-")]
    pub input: PathBuf,

    /// Never call the completion API
    #[arg(long)]
    pub offline: bool,

    /// Completion model to use
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Never call the completion API
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(value_name = "FILE", default_value = "infraexplain.yaml")]
    pub config: PathBuf,
}
