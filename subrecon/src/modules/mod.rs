use async_trait::async_trait;

use crate::{
    config::Tools,
    runner::{self, Runner},
    Error,
};

mod assetfinder;
mod subfinder;

pub use assetfinder::Assetfinder;
pub use subfinder::Subfinder;

pub trait Module {
    fn name(&self) -> String;
    fn description(&self) -> String;
}

/// A source of candidate subdomains backed by an external tool.
#[async_trait]
pub trait SubdomainModule: Module + Send + Sync {
    /// A required source failing aborts the run; others are skipped.
    fn required(&self) -> bool;

    /// Program invoked by [`SubdomainModule::enumerate`].
    fn program(&self) -> &str;

    fn is_available(&self) -> bool {
        runner::find_executable(self.program()).is_some()
    }

    /// Raw stdout lines of the tool, one candidate per line.
    async fn enumerate(&self, runner: &Runner, domain: &str) -> Result<Vec<String>, Error>;
}

pub fn all_subdomains_modules(tools: &Tools) -> Vec<Box<dyn SubdomainModule>> {
    vec![
        Box::new(Assetfinder::new(&tools.assetfinder)),
        Box::new(Subfinder::new(&tools.subfinder)),
    ]
}
