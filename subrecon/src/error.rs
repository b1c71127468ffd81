use std::{io, path::PathBuf, process::ExitStatus, time::Duration};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Usage: subrecon <example.com>")]
    CliUsage,
    #[error(
        "Missing required tools: {}\n    Install them and make sure they're in your $PATH.",
        .0.join(", ")
    )]
    MissingTools(Vec<String>),
    #[error("{tool}: could not be started: {source}")]
    Spawn { tool: String, source: io::Error },
    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: ExitStatus },
    #[error("{tool} timed out after {}s", .after.as_secs())]
    Timeout { tool: String, after: Duration },
    #[error("{}: input file not found", .0.display())]
    FilterInputMissing(PathBuf),
    #[error("invalid status code '{0}': expected digits only, e.g. 200")]
    InvalidStatusCode(String),
    #[error("invalid domain '{0}'")]
    InvalidDomain(String),
    #[error("invalid artifact name '{0}': expected a plain file name")]
    InvalidArtifactName(String),
    #[error("I/O: {0}")]
    Io(#[from] io::Error),
    #[error("Regex: {0}")]
    Regex(#[from] regex::Error),
}
