use std::path::Path;

use crate::{
    runner::{Runner, ToolCommand},
    Error,
};

/// dnsx keeping only hosts with an A record.
pub fn resolve_command(program: &str, subdomains: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new(program)
        .arg("-l")
        .arg(subdomains)
        .args(["-a", "-silent"])
        .arg("-o")
        .arg(output)
}

/// Resolve every host of `subdomains` into `output`. The output itself is not
/// looked at; callers count its lines.
pub async fn resolve(
    runner: &Runner,
    program: &str,
    subdomains: &Path,
    output: &Path,
) -> Result<(), Error> {
    runner
        .run(&resolve_command(program, subdomains, output), false)
        .await?
        .ensure_success()?;

    Ok(())
}
