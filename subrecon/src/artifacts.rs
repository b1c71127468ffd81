use std::{
    collections::BTreeSet,
    io,
    path::{Component, Path, PathBuf},
};

use tokio::fs;
use tracing::debug;

use crate::Error;

pub const SUBDOMAINS: &str = "subs.txt";
pub const RESOLVED: &str = "resolved.txt";
pub const LIVE: &str = "live.txt";
pub const FILTERED: &str = "live-200.txt";

/// Files a run leaves behind, in the order the stages write them.
pub const ALL: [&str; 4] = [SUBDOMAINS, RESOLVED, LIVE, FILTERED];

/// The directory a run writes its artifacts to. Every stage gets its paths
/// from here; the process working directory is never changed.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        OutputDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn subdomains(&self) -> PathBuf {
        self.path(SUBDOMAINS)
    }

    pub fn resolved(&self) -> PathBuf {
        self.path(RESOLVED)
    }

    pub fn live(&self) -> PathBuf {
        self.path(LIVE)
    }

    /// Create the directory and drop artifacts left by an earlier run, so
    /// every file found after this run was written by it.
    pub async fn prepare(&self, extra: &[&str]) -> Result<(), Error> {
        fs::create_dir_all(&self.root).await?;

        for name in ALL.iter().chain(extra) {
            let path = self.path(name);
            match fs::remove_file(&path).await {
                Ok(()) => debug!("removed stale {}", path.display()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

/// Sorted, newline terminated.
pub async fn write_subdomains(path: &Path, subdomains: &BTreeSet<String>) -> Result<(), Error> {
    let mut contents = String::new();
    for subdomain in subdomains {
        contents.push_str(subdomain);
        contents.push('\n');
    }

    fs::write(path, contents).await?;
    Ok(())
}

/// Non-blank lines of `path`; a file the tool never created counts as empty.
pub async fn count_lines(path: &Path) -> Result<usize, Error> {
    match fs::read(path).await {
        Ok(raw) => Ok(String::from_utf8_lossy(&raw)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(err) => Err(err.into()),
    }
}

/// Artifact names are plain file names inside the output directory.
pub fn validate_name(name: &str) -> Result<(), Error> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::InvalidArtifactName(name.to_string())),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

/// Remove the four artifacts from `dir`.
pub fn clean(dir: &Path) -> Result<CleanReport, Error> {
    let mut report = CleanReport::default();

    for name in ALL {
        match std::fs::remove_file(dir.join(name)) {
            Ok(()) => report.removed.push(name),
            Err(err) if err.kind() == io::ErrorKind::NotFound => report.missing.push(name),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(report)
}
