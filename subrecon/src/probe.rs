use std::path::Path;

use crate::{
    runner::{Runner, ToolCommand},
    Error,
};

const ANNOTATIONS: [&str; 6] = [
    "-status-code",
    "-title",
    "-tech-detect",
    "-web-server",
    "-ip",
    "-location",
];

/// httpx with one annotated record per live host. Colors are turned off,
/// though the filter strips escapes regardless.
pub fn probe_command(program: &str, resolved: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new(program)
        .arg("-l")
        .arg(resolved)
        .args(ANNOTATIONS)
        .args(["-silent", "-nc"])
        .arg("-o")
        .arg(output)
}

pub async fn probe(
    runner: &Runner,
    program: &str,
    resolved: &Path,
    output: &Path,
) -> Result<(), Error> {
    runner
        .run(&probe_command(program, resolved, output), false)
        .await?
        .ensure_success()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prober_arguments() {
        let command = probe_command("httpx", Path::new("resolved.txt"), Path::new("live.txt"));

        assert_eq!(command.program(), "httpx");
        assert_eq!(
            command.get_args().collect::<Vec<_>>(),
            [
                "-l",
                "resolved.txt",
                "-status-code",
                "-title",
                "-tech-detect",
                "-web-server",
                "-ip",
                "-location",
                "-silent",
                "-nc",
                "-o",
                "live.txt",
            ]
        );
    }
}
