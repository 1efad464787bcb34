//! InfraExplain CLI entry point.
//!
//! This binary provides the command-line interface for InfraExplain.

use clap::Parser;
use infraexplain::cli::{Cli, Commands, ExplainArgs, ParseArgs, ServeArgs};
use infraexplain::config::DEFAULT_CONFIG_FILES;
use infraexplain::error::ResultExt;
use infraexplain::explainer::Explainer;
use infraexplain::reporter::Reporter;
use infraexplain::server::{self, AppState};
use infraexplain::{Config, InfraExplainError, Inspector};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");

            eprintln!("Error: {e}");

            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut i = 0;
                while let Some(cause) = source {
                    eprintln!("  {i}: {cause}");
                    source = cause.source();
                    i += 1;
                }
            }

            let code = e
                .downcast_ref::<InfraExplainError>()
                .map_or(1, InfraExplainError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let base_level = match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            EnvFilter::new(format!("warn,infraexplain={base_level}"))
        })
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli.config;

    match cli.command {
        Commands::Parse(args) => run_parse(load_config(config_path.as_deref())?, args).await,
        Commands::Explain(args) => run_explain(load_config(config_path.as_deref())?, args).await,
        Commands::Serve(args) => run_serve(load_config(config_path.as_deref())?, args).await,

        Commands::Init => {
            let config_path = Path::new(DEFAULT_CONFIG_FILES[0]);

            if config_path.exists() {
                anyhow::bail!("Configuration file already exists: {}", config_path.display());
            }

            std::fs::write(config_path, Config::example_yaml())?;
            println!("Created example configuration: {}", config_path.display());
            Ok(ExitCode::SUCCESS)
        }

        // Only the named file is read; no default configuration is discovered.
        Commands::Validate(args) => match Config::from_file(&args.config).and_then(|c| c.validate()) {
            Ok(rules) => {
                println!("Configuration is valid: {}", args.config.display());
                println!("\nActive rules:");
                for rule in rules.iter() {
                    println!("  {:<8} {}", rule.code(), rule.description());
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Configuration error: {e}");
                Ok(ExitCode::from(1))
            }
        },
    }
}

async fn run_parse(mut config: Config, args: ParseArgs) -> anyhow::Result<ExitCode> {
    config.merge_cli_args(&args.analysis);

    let text = read_input(&args.input).await?;
    let doc = Inspector::new(&config)?.inspect(&text)?;

    let report = Reporter::new(&config).generate(&doc, args.format)?;

    if let Some(output_path) = args.output {
        std::fs::write(&output_path, &report).with_path(&output_path)?;
        tracing::info!(path = %output_path.display(), "Report written");
    } else {
        println!("{report}");
    }

    if args.strict && doc.has_security_findings() {
        tracing::debug!("Security findings in strict mode");
        return Ok(ExitCode::from(1));
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_explain(mut config: Config, args: ExplainArgs) -> anyhow::Result<ExitCode> {
    config.merge_cli_args(&args.analysis);
    if let Some(model) = args.model {
        config.explain.model = model;
    }

    let text = read_input(&args.input).await?;
    let doc = Inspector::new(&config)?.inspect(&text)?;

    let explainer = if args.offline {
        Explainer::offline()
    } else {
        Explainer::from_options(&config.explain)?
    };

    println!("{}", explainer.explain(&doc).await);
    Ok(ExitCode::SUCCESS)
}

async fn run_serve(mut config: Config, args: ServeArgs) -> anyhow::Result<ExitCode> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    config.validate()?;

    let explainer = if args.offline {
        Explainer::offline()
    } else {
        Explainer::from_options(&config.explain)?
    };
    let state = AppState::new(Inspector::new(&config)?, explainer);

    server::serve(&config.server, Arc::new(state)).await?;
    Ok(ExitCode::SUCCESS)
}

/// Read configuration text from a file, or stdin for `-`.
async fn read_input(input: &Path) -> infraexplain::Result<String> {
    if input == Path::new("-") {
        tracing::debug!("Reading configuration from stdin");
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }

    tracing::debug!(path = %input.display(), "Reading configuration file");
    tokio::fs::read_to_string(input).await.with_path(input)
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    tracing::debug!("Loading configuration");
    let mut config = if let Some(config_path) = explicit {
        tracing::debug!(path = %config_path.display(), "Loading configuration from explicit path");
        Config::from_file(config_path)?
    } else if let Some(path) = DEFAULT_CONFIG_FILES.iter().map(Path::new).find(|p| p.exists()) {
        tracing::debug!(path = %path.display(), "Found configuration file");
        Config::from_file(path)?
    } else {
        tracing::debug!("No configuration file found, using default configuration");
        Config::default()
    };

    config.load_api_key_from_env();
    Ok(config)
}
