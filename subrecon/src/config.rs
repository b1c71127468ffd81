use std::{path::PathBuf, time::Duration};

use crate::{
    args::{ScanArgs, ToolArgs},
    artifacts,
    filter::StatusCode,
    Error,
};

/// Programs invoked for each stage, as names looked up on `PATH` or paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub assetfinder: String,
    pub subfinder: String,
    pub dnsx: String,
    pub httpx: String,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            assetfinder: String::from("assetfinder"),
            subfinder: String::from("subfinder"),
            dnsx: String::from("dnsx"),
            httpx: String::from("httpx"),
        }
    }
}

impl Tools {
    /// Tools the chain cannot run without, checked before any stage.
    pub fn required(&self) -> [&str; 3] {
        [
            self.assetfinder.as_str(),
            self.dnsx.as_str(),
            self.httpx.as_str(),
        ]
    }

    pub fn optional(&self) -> [&str; 1] {
        [self.subfinder.as_str()]
    }
}

impl From<ToolArgs> for Tools {
    fn from(args: ToolArgs) -> Self {
        Tools {
            assetfinder: args.assetfinder,
            subfinder: args.subfinder,
            dnsx: args.dnsx,
            httpx: args.httpx,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterSettings {
    pub codes: Vec<StatusCode>,
    /// File name of the filtered list inside the output directory.
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub domain: String,
    pub outdir: PathBuf,
    pub verbose: bool,
    pub timeout: Option<Duration>,
    /// `None` when filtering is disabled.
    pub filter: Option<FilterSettings>,
    pub tools: Tools,
}

impl Settings {
    pub fn new(domain: &str, outdir: impl Into<PathBuf>) -> Self {
        Settings {
            domain: domain.to_string(),
            outdir: outdir.into(),
            verbose: false,
            timeout: None,
            filter: Some(FilterSettings {
                codes: vec![StatusCode::default()],
                output: String::from(artifacts::FILTERED),
            }),
            tools: Tools::default(),
        }
    }

    pub fn default_outdir(domain: &str) -> PathBuf {
        PathBuf::from("outputs").join(domain)
    }
}

impl TryFrom<ScanArgs> for Settings {
    type Error = Error;

    fn try_from(args: ScanArgs) -> Result<Self, Self::Error> {
        let domain = args.domain.ok_or(Error::CliUsage)?;
        artifacts::validate_name(&args.filtered)?;

        let filter = (!args.no_filter).then(|| FilterSettings {
            codes: args.status,
            output: args.filtered,
        });

        let outdir = args
            .outdir
            .unwrap_or_else(|| Settings::default_outdir(&domain));

        Ok(Settings {
            verbose: args.verbose,
            timeout: args.timeout.filter(|secs| *secs > 0).map(Duration::from_secs),
            filter,
            tools: args.tools.into(),
            ..Settings::new(&domain, outdir)
        })
    }
}
