pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use capmodel_core::{AppConfig, LoadOptions, LogFormat};
use clap::{Parser, Subcommand};

use commands::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Parser)]
#[command(
    name = "capmodel",
    about = "Capacity model CLI",
    long_about = "Classify sales projects into role buckets and roll them up per salesperson \
                  against a hosted spreadsheet.",
    after_help = "Examples:\n  capmodel generate\n  capmodel insights\n  capmodel export -o projection.csv"
)]
pub struct Cli {
    /// Path to capmodel.toml (defaults to ./capmodel.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the capacity model and write the projection and summary sheets")]
    Generate,
    #[command(about = "Run the capacity model and export the projection as CSV")]
    Export {
        #[arg(long, short, help = "Output file (default: capacity_model_YYYY-MM-DD.csv)")]
        output: Option<PathBuf>,
    },
    #[command(about = "Run the capacity model and emit the summary report as JSON")]
    Insights,
    #[command(about = "Show the active role rules from the Matrix sheet")]
    Matrix,
    #[command(name = "update-matrix", about = "Replace the Matrix sheet from a JSON rules file")]
    UpdateMatrix {
        #[arg(long, help = "JSON file with an array of role rules")]
        criteria: PathBuf,
    },
    #[command(about = "Trigger capacity model generation via the deployed webhook")]
    Trigger {
        #[arg(long, help = "Webhook URL (overrides webhook.url from config)")]
        webhook_url: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
    #[command(about = "Validate config and spreadsheet credential readiness")]
    Doctor,
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // Command output goes to stdout; logs stay on stderr.
    match config.logging.format {
        LogFormat::Compact => {
            let _ = tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .compact()
                .try_init();
        }
        LogFormat::Pretty => {
            let _ = tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .pretty()
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .json()
                .try_init();
        }
    }
}

pub async fn run() -> ExitCode {
    let result = dispatch(Cli::parse()).await;
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Load config, set up logging, and run the selected subcommand.
pub async fn dispatch(cli: Cli) -> CommandResult {
    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            );
        }
    };
    init_logging(&config);

    match cli.command {
        Command::Generate => commands::generate::run(&config).await,
        Command::Export { output } => commands::export::run(&config, output).await,
        Command::Insights => commands::insights::run(&config).await,
        Command::Matrix => commands::matrix::run(&config).await,
        Command::UpdateMatrix { criteria } => {
            commands::update_matrix::run(&config, &criteria).await
        }
        Command::Trigger { webhook_url } => commands::trigger::run(&config, webhook_url).await,
        Command::Config => commands::config::run(&config),
        Command::Doctor => commands::doctor::run(&config),
    }
}
