//! xcpkg CLI - inspect Xcode projects and their Swift packages

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xcpkg::util::diagnostic;
use xcpkg::ParseError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ParseError>() {
            Some(parse_error) => diagnostic::emit(&parse_error.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("xcpkg=debug")
    } else {
        EnvFilter::new("xcpkg=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Targets(args) => commands::targets::execute(args, &config),
        Commands::Packages(args) => commands::packages::execute(args, &config),
        Commands::Dump(args) => commands::dump::execute(args, &config),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
