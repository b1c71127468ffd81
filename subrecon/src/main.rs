use anyhow::Result;
use args::{Args, Command};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod artifacts;
mod cli;
mod config;
mod dns;
mod error;
mod filter;
mod modules;
mod pipeline;
mod probe;
mod runner;
mod subdomains;
#[cfg(test)]
mod testing;
pub use error::Error;

fn main() -> Result<()> {
    let args = Args::parse();

    let verbose = args.command.is_none() && args.scan.verbose;
    let default_filter = if verbose { "subrecon=debug" } else { "subrecon=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Some(Command::Clean { dir }) => cli::clean(&dir)?,
        Some(Command::Filter {
            input,
            output,
            status,
        }) => cli::filter(&input, &output, status)?,
        Some(Command::Tools { tools }) => cli::tools(tools),
        None => cli::scan(args.scan)?,
    }

    Ok(())
}
