mod artifact;
mod cli;
mod correlation;
mod daily;
mod disaster;
mod error;
mod merge;
mod parquet;
mod plot;
mod reading;
mod station;

use std::process::ExitCode;

use clap::Parser;
use cli::{command, Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Preprocess(args) => command::preprocess(args),
        Commands::Disasters(args) => command::disasters(args),
        Commands::Analyse(args) => command::analyse(args),
        Commands::Run(args) => command::run(args),
    };

    match result {
        Ok(paths) => {
            for path in paths {
                println!("File saved to `{}`", path.display());
            }
            if let Some(next) = cli.command.next_step() {
                println!("Next step: run `{}`", next);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}
