//! Barcodegen CLI - render barcodes from the command line.
//!
//! A thin adapter over the `barcodegen` library.

mod commands;
mod error;

use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use crate::commands::render::RenderArgs;
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "barcodegen", version, about = "Render barcodes to PNG, JPEG or GIF")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a barcode image
    Render(RenderArgs),
    /// List the available symbologies
    List,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Render(args) => commands::render::run(args),
        Command::List => commands::list::run(),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = barcodegen::logging::init_logging(log_level(cli.verbose)) {
        eprintln!("Warning: failed to initialise logging: {}", e);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["barcodegen", "-vv", "list"]).unwrap();
        assert_eq!(log_level(cli.verbose), Level::DEBUG);
        assert_eq!(log_level(0), Level::WARN);
    }

    #[test]
    fn test_render_subcommand() {
        let cli = Cli::try_parse_from(["barcodegen", "render", "i25", "1234", "-O", "dpi="]).unwrap();
        match cli.command {
            Command::Render(args) => {
                assert_eq!(args.symbology.as_deref(), Some("i25"));
                assert_eq!(args.options, vec![("dpi".to_string(), String::new())]);
            }
            Command::List => panic!("expected render"),
        }
    }
}
