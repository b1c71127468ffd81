use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{artifacts, filter::StatusCode, Error};

#[derive(Parser, Debug)]
#[command(
    name = "subrecon",
    version,
    about = "Subdomain recon chain: enumerate, resolve, probe, filter",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub scan: ScanArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove recon artifacts from a directory
    Clean {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Filter prober output by HTTP status code
    Filter {
        #[arg(short, long, default_value = artifacts::LIVE)]
        input: PathBuf,
        #[arg(short, long, default_value = artifacts::FILTERED)]
        output: PathBuf,
        #[arg(short, long, value_delimiter = ',', default_value = "200")]
        status: Vec<StatusCode>,
    },
    /// List the external tools and whether they are installed
    Tools {
        #[command(flatten)]
        tools: ToolArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct ScanArgs {
    /// Target domain
    #[arg(required = true, value_parser = parse_domain)]
    pub domain: Option<String>,

    /// Output directory [default: outputs/<domain>]
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Show tool output and command lines
    #[arg(short, long)]
    pub verbose: bool,

    /// Status codes to keep, comma separated
    #[arg(short, long, value_delimiter = ',', default_value = "200")]
    pub status: Vec<StatusCode>,

    /// Skip the status code filter step
    #[arg(long)]
    pub no_filter: bool,

    /// File name of the filtered URL list
    #[arg(long, value_name = "NAME", default_value = artifacts::FILTERED)]
    pub filtered: String,

    /// Kill any external tool still running after this many seconds
    #[arg(long, value_name = "SECS", env = "SUBRECON_TIMEOUT")]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(clap::Args, Debug, Clone)]
#[command(next_help_heading = "Tools")]
pub struct ToolArgs {
    /// Required subdomain enumerator
    #[arg(long = "assetfinder-bin", value_name = "PATH", env = "SUBRECON_ASSETFINDER", default_value = "assetfinder")]
    pub assetfinder: String,

    /// Optional subdomain enumerator
    #[arg(long = "subfinder-bin", value_name = "PATH", env = "SUBRECON_SUBFINDER", default_value = "subfinder")]
    pub subfinder: String,

    /// DNS resolver
    #[arg(long = "dnsx-bin", value_name = "PATH", env = "SUBRECON_DNSX", default_value = "dnsx")]
    pub dnsx: String,

    /// HTTP prober
    #[arg(long = "httpx-bin", value_name = "PATH", env = "SUBRECON_HTTPX", default_value = "httpx")]
    pub httpx: String,
}

/// Lowercase hostname made of letters, digits, `-`, `_` and `.`. A leading
/// `-` is rejected so the value can never be read as a flag by a tool.
pub fn parse_domain(value: &str) -> Result<String, Error> {
    let domain = value.trim().to_lowercase();

    let valid = !domain.is_empty()
        && !domain.starts_with(&['-', '.'][..])
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));

    if valid {
        Ok(domain)
    } else {
        Err(Error::InvalidDomain(value.to_string()))
    }
}
