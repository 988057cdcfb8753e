pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use supportdesk_core::config::{ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "supportdesk",
    about = "Supportdesk operator CLI",
    long_about = "Inspect configuration, check readiness, list products, and triage single customer messages.",
    after_help = "Examples:\n  supportdesk doctor --json\n  supportdesk config --model gpt-4o\n  supportdesk process --product MobileApp --message \"I can't log in\""
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a supportdesk.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Product catalog path, overriding config and env")]
    catalog: Option<PathBuf>,
    #[arg(long, global = true, help = "Completion model, overriding config and env")]
    model: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, product catalog, and completion client settings")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List configured products with their components and inquiry categories")]
    Catalog,
    #[command(about = "Run one customer message through the live triage pipeline")]
    Process {
        #[arg(long, help = "Product name as registered in the catalog")]
        product: String,
        #[arg(long, help = "Customer message text")]
        message: String,
        #[arg(long, default_value = "cli", help = "Customer identifier recorded with the message")]
        customer_id: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        overrides: ConfigOverrides { llm_model: cli.model, catalog_path: cli.catalog },
    };

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => commands::doctor::run(&options, json),
        Command::Catalog => commands::catalog::run(&options),
        Command::Process { product, message, customer_id } => commands::process::run(
            &options,
            commands::process::ProcessArgs { product, message, customer_id },
        ),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
