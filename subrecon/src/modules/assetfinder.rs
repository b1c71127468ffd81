use async_trait::async_trait;

use super::{Module, SubdomainModule};
use crate::{
    runner::{Runner, ToolCommand},
    Error,
};

pub struct Assetfinder {
    program: String,
}

impl Assetfinder {
    pub fn new(program: &str) -> Self {
        Assetfinder {
            program: program.to_string(),
        }
    }

    fn command(&self, domain: &str) -> ToolCommand {
        ToolCommand::new(&self.program).args(["--subs-only", domain])
    }
}

impl Module for Assetfinder {
    fn name(&self) -> String {
        String::from("subdomains/assetfinder")
    }

    fn description(&self) -> String {
        String::from("Find related domains and subdomains from public sources (required)")
    }
}

#[async_trait]
impl SubdomainModule for Assetfinder {
    fn required(&self) -> bool {
        true
    }

    fn program(&self) -> &str {
        &self.program
    }

    async fn enumerate(&self, runner: &Runner, domain: &str) -> Result<Vec<String>, Error> {
        let output = runner
            .run(&self.command(domain), true)
            .await?
            .ensure_success()?;

        Ok(output.lines)
    }
}
