mod cli;
mod commands;
mod config;
mod invocation;
mod paths;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub json: bool,
    pub config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        json: cli.json,
        config: cli.config,
    };

    match cli.command {
        Command::Ttrss(args) => commands::user::ttrss(&ctx, args),
        Command::Freshrss(args) => commands::user::freshrss(&ctx, args),
        Command::Run { args_file } => commands::run::run(&ctx, &args_file),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "hostusers", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
