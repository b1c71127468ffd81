use std::{
    env,
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
    time,
};
use tokio_stream::{wrappers::SplitStream, StreamExt};
use tracing::{debug, warn};

use crate::Error;

/// An external tool invocation: a program and its discrete arguments.
/// Nothing here ever goes through a shell.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        ToolCommand {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())?;
        for arg in self.get_args() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ToolOutput {
    pub tool: String,
    pub status: ExitStatus,
    /// Stdout lines, only filled in when the caller asked for them.
    pub lines: Vec<String>,
}

impl ToolOutput {
    pub fn ensure_success(self) -> Result<Self, Error> {
        if self.status.success() {
            Ok(self)
        } else {
            Err(Error::ToolFailed {
                tool: self.tool,
                status: self.status,
            })
        }
    }
}

#[derive(Clone, Copy)]
enum Echo {
    Stdout,
    Stderr,
    Silent,
}

/// Runs external tools to completion, one call at a time per future.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    verbose: bool,
    timeout: Option<Duration>,
}

impl Runner {
    pub fn new(verbose: bool, timeout: Option<Duration>) -> Self {
        Runner { verbose, timeout }
    }

    /// Run `command` and wait for it. With `capture` set, stdout lines are
    /// returned; in verbose mode they are also echoed, along with stderr.
    ///
    /// A non-zero exit is not an error here, callers decide with
    /// [`ToolOutput::ensure_success`]. A timeout kills the child.
    pub async fn run(&self, command: &ToolCommand, capture: bool) -> Result<ToolOutput, Error> {
        if self.verbose {
            debug!("  [+] {}", command);
        }

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if self.verbose {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                tool: command.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_echo = if self.verbose { Echo::Stdout } else { Echo::Silent };

        let finished = {
            let work = async {
                tokio::join!(
                    drain(stdout, stdout_echo, capture),
                    drain(stderr, Echo::Stderr, false),
                    child.wait(),
                )
            };

            match self.timeout {
                Some(limit) => time::timeout(limit, work).await.ok(),
                None => Some(work.await),
            }
        };

        let Some((lines, _, status)) = finished else {
            if let Err(err) = child.kill().await {
                warn!("{}: could not kill timed out process: {}", command.program, err);
            }
            return Err(Error::Timeout {
                tool: command.program.clone(),
                after: self.timeout.unwrap_or_default(),
            });
        };

        let status = status?;
        if !status.success() && self.verbose {
            warn!("  [!] {}: {}", status, command);
        }

        Ok(ToolOutput {
            tool: command.program.clone(),
            status,
            lines: lines?,
        })
    }
}

async fn drain<R>(reader: Option<R>, echo: Echo, keep: bool) -> Result<Vec<String>, Error>
where
    R: AsyncRead + Unpin,
{
    let mut kept = Vec::new();
    let Some(reader) = reader else {
        return Ok(kept);
    };

    let mut lines = SplitStream::new(BufReader::new(reader).split(b'\n'));
    while let Some(line) = lines.next().await {
        let line = decode_line(&line?);
        match echo {
            Echo::Stdout => println!("{}", line),
            Echo::Stderr => eprintln!("{}", line),
            Echo::Silent => {}
        }
        if keep {
            kept.push(line);
        }
    }

    Ok(kept)
}

/// Text of one raw output line. Bytes that are not valid UTF-8 are dropped,
/// as is a trailing `\r`.
pub fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).replace(char::REPLACEMENT_CHARACTER, "")
}

/// Locate `program` the way a shell would: a value with a path separator is
/// checked as is, anything else is searched for on `PATH`.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
