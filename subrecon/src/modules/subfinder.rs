use async_trait::async_trait;

use super::{Module, SubdomainModule};
use crate::{
    runner::{Runner, ToolCommand},
    Error,
};

pub struct Subfinder {
    program: String,
}

impl Subfinder {
    pub fn new(program: &str) -> Self {
        Subfinder {
            program: program.to_string(),
        }
    }

    fn command(&self, domain: &str) -> ToolCommand {
        ToolCommand::new(&self.program).args(["-d", domain, "-silent"])
    }
}

impl Module for Subfinder {
    fn name(&self) -> String {
        String::from("subdomains/subfinder")
    }

    fn description(&self) -> String {
        String::from("Passive subdomain discovery from many sources (optional)")
    }
}

#[async_trait]
impl SubdomainModule for Subfinder {
    fn required(&self) -> bool {
        false
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
