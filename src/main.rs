#![warn(clippy::pedantic)]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use human_panic::setup_panic;

use nimbus::commands;

/// Nimbus is the command-line companion for the Nimbus platform
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the command to update Nimbus CLI for this installation
    //
    // The update command owns its argument parsing, help rendering, and
    // exit codes, so clap's built-in help flag is disabled and the raw
    // arguments are passed through untouched.
    #[command(disable_help_flag = true)]
    Update {
        /// Raw arguments handled by the update command itself
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    setup_panic!();
    env_logger::init();

    log::debug!("Parsing command line arguments...");
    let args = Args::parse();
    log::trace!("Parsed command line arguments: {args:#?}");

    let code = match args.command {
        Command::Update { args } => commands::update::run(&args).await?,
    };
    Ok(ExitCode::from(code))
}
