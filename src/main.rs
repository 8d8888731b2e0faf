mod cli;
mod commands;
mod ledger;
mod model;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::AddManpower(args) => commands::entry::add_manpower(args),
        Commands::AddActivity(args) => commands::entry::add_activity(args),
        Commands::AddAlert(args) => commands::entry::add_alert(args),
        Commands::Eod(args) => commands::entry::apply_eod(args),
        Commands::DeleteManpower(args) => commands::entry::delete_manpower(args),
        Commands::Metrics(args) => commands::report::metrics(args),
        Commands::Show(args) => commands::report::show(args),
        Commands::Export(args) => commands::export::run(args),
        Commands::Dates(args) => commands::dates::run(args),
        Commands::Shell(args) => commands::shell::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
