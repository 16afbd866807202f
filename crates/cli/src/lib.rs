pub mod commands;
pub mod logging;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use retrieval_ask_core::config::{AppConfig, LoadOptions};
use retrieval_ask_core::OverridePolicy;

#[derive(Debug, Parser)]
#[command(
    name = "retrieval-ask",
    about = "Retrieval pricing function with per-client ask overrides",
    long_about = "Reads one PricingInput JSON record from stdin and writes the Ask to offer that client to stdout. Clients listed in the override table receive their configured ask; everyone else receives the CurrentAsk from the request.",
    after_help = "Examples:\n  retrieval-ask < request.json\n  retrieval-ask --config asks.toml price < request.json\n  retrieval-ask overrides --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to the TOML config holding operator ask overrides")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price one request read from stdin (the default when no command is given)")]
    Price,
    #[command(about = "Show the effective per-client override table")]
    Overrides {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("config validation failed: {error}");
            return ExitCode::from(commands::EXIT_CONFIG_FAILURE);
        }
    };

    if let Err(error) = logging::init(&config.logging) {
        eprintln!("{error:#}");
    }

    let table = config.override_table();
    match cli.command.unwrap_or(Command::Price) {
        Command::Price => {
            let policy = OverridePolicy::new(table);
            let exit_code = commands::price::run(
                io::stdin().lock(),
                io::stdout().lock(),
                io::stderr(),
                &policy,
            );
            ExitCode::from(exit_code)
        }
        Command::Overrides { json } => {
            let result = commands::overrides::run(&table, json);
            println!("{}", result.output);
            ExitCode::from(result.exit_code)
        }
    }
}
