mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod ui;

use anyhow::Result;
use awskit::ConnectionSettings;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::AppConfig;
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub config: AppConfig,
    pub connection: ConnectionSettings,
}

fn main() -> ExitCode {
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

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("{err:?}");
            if let Err(emit_err) = ui::emit(&ui::failure_record(&err)) {
                ui::error(&format!("{err:#} ({emit_err})"));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "awsmod", &mut io::stdout());
        return Ok(());
    }

    let config = AppConfig::load()?;
    let connection = config.connection(&cli.aws);
    let ctx = Context {
        config,
        connection,
    };

    match &cli.command {
        Command::TaskDefinitions(args) => ui::emit(&commands::task_definitions::run(&ctx, args)?),
        Command::User(args) => ui::emit(&commands::user::run(&ctx, args)?),
        Command::Config(cmd) => commands::config::run(&ctx, cmd),
        Command::Completions { .. } => Ok(()),
    }
}
