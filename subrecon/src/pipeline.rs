use std::{path::PathBuf, time::Duration};

use tracing::debug;

use crate::{
    artifacts::{self, OutputDir},
    config::Settings,
    dns,
    filter::StatusFilter,
    modules::{self, SubdomainModule},
    probe,
    runner::{self, Runner},
    subdomains, Error,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered {
    pub label: String,
    pub kept: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub subdomains: usize,
    pub resolved: usize,
    pub live: usize,
    pub filtered: Option<Filtered>,
}

/// How a run ended when no tool failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoSubdomains,
    NothingResolved { subdomains: usize },
    NoLiveHosts { subdomains: usize, resolved: usize },
    TimedOut { tool: String, after: Duration },
    Completed(Summary),
}

pub struct Pipeline {
    settings: Settings,
    runner: Runner,
    modules: Vec<Box<dyn SubdomainModule>>,
    output: OutputDir,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        let modules = modules::all_subdomains_modules(&settings.tools);
        Pipeline::with_modules(settings, modules)
    }

    pub fn with_modules(settings: Settings, modules: Vec<Box<dyn SubdomainModule>>) -> Self {
        Pipeline {
            runner: Runner::new(settings.verbose, settings.timeout),
            output: OutputDir::new(&settings.outdir),
            modules,
            settings,
        }
    }

    pub fn output(&self) -> &OutputDir {
        &self.output
    }

    /// Every required tool must be installed before anything runs.
    pub fn preflight(&self) -> Result<(), Error> {
        let missing: Vec<String> = self
            .settings
            .tools
            .required()
            .into_iter()
            .filter(|tool| runner::find_executable(tool).is_none())
            .map(String::from)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingTools(missing))
        }
    }

    /// Pre-flight, then enumerate, resolve, probe and filter. Stages that come
    /// up empty end the run early with the matching [`Outcome`]; a tool
    /// exceeding the timeout ends it with [`Outcome::TimedOut`].
    pub async fn run(&self) -> Result<Outcome, Error> {
        self.preflight()?;

        match self.chain().await {
            Err(Error::Timeout { tool, after }) => Ok(Outcome::TimedOut { tool, after }),
            result => result,
        }
    }

    async fn chain(&self) -> Result<Outcome, Error> {
        let domain = &self.settings.domain;
        let tools = &self.settings.tools;
        let filter = match &self.settings.filter {
            Some(filter) => Some((
                StatusFilter::new(filter.codes.iter().cloned())?,
                self.output.path(&filter.output),
            )),
            None => None,
        };

        let extra: Vec<&str> = self
            .settings
            .filter
            .iter()
            .map(|filter| filter.output.as_str())
            .collect();
        self.output.prepare(&extra).await?;
        debug!("writing artifacts to {}", self.output.root().display());

        println!("[*] Target: {}\n", domain);

        println!("[1/3] Enumerating subdomains...");
        let found = subdomains::enumerate(&self.runner, &self.modules, domain).await?;
        artifacts::write_subdomains(&self.output.subdomains(), &found).await?;
        if found.is_empty() {
            println!("[!] No subdomains found.");
            return Ok(Outcome::NoSubdomains);
        }
        println!("      {} unique -> {}", found.len(), artifacts::SUBDOMAINS);

        println!("[2/3] Resolving DNS...");
        let resolved_path = self.output.resolved();
        dns::resolve(&self.runner, &tools.dnsx, &self.output.subdomains(), &resolved_path).await?;
        let resolved = artifacts::count_lines(&resolved_path).await?;
        println!("      {} resolved -> {}", resolved, artifacts::RESOLVED);
        if resolved == 0 {
            println!("[!] Nothing resolved.");
            return Ok(Outcome::NothingResolved {
                subdomains: found.len(),
            });
        }

        println!("[3/3] Probing for live hosts...");
        let live_path = self.output.live();
        probe::probe(&self.runner, &tools.httpx, &resolved_path, &live_path).await?;
        let live = artifacts::count_lines(&live_path).await?;
        println!("      {} live -> {}", live, artifacts::LIVE);
        if live == 0 {
            println!("[!] No live hosts found.");
            return Ok(Outcome::NoLiveHosts {
                subdomains: found.len(),
                resolved,
            });
        }

        let filtered = match filter {
            Some((filter, path)) => {
                let kept = filter.filter_file(&live_path, &path).await?;
                let label = filter.label();
                println!("[4/4] Filtered [{}] -> {} URL(s)", label, kept);
                Some(Filtered { label, kept, path })
            }
            None => None,
        };

        Ok(Outcome::Completed(Summary {
            subdomains: found.len(),
            resolved,
            live,
            filtered,
        }))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        config::Tools,
        testing::{fake_tool, process_lock},
    };

    const ARGS: &str = r#"while [ $# -gt 0 ]; do
  case "$1" in
    -l) input="$2"; shift ;;
    -o) output="$2"; shift ;;
  esac
  shift
done"#;

    struct Fakes {
        dir: tempfile::TempDir,
    }

    impl Fakes {
        /// Stand-ins for the four tools. `assetfinder` prints `subs`; the
        /// resolver keeps hosts not starting with `dead`; the prober answers
        /// 200 for hosts starting with `www` and 404 otherwise.
        fn new(subs: &str, extra: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let bin = dir.path();

            fake_tool(bin, "assetfinder", &format!("printf '{}'", subs));
            fake_tool(bin, "subfinder", &format!("printf '{}'", extra));
            fake_tool(
                bin,
                "dnsx",
                &format!("{}\ngrep -v '^dead' \"$input\" > \"$output\" || true", ARGS),
            );
            fake_tool(
                bin,
                "httpx",
                &format!(
                    "{}\nwhile read -r host; do\n  case \"$host\" in\n    www*) echo \"https://$host [200] [Home] [nginx]\" ;;\n    *) echo \"https://$host [404] [Not Found]\" ;;\n  esac\ndone < \"$input\" > \"$output\"",
                    ARGS
                ),
            );

            Fakes { dir }
        }

        fn tool(&self, name: &str) -> String {
            self.dir.path().join(name).to_string_lossy().into_owned()
        }

        fn tools(&self) -> Tools {
            Tools {
                assetfinder: self.tool("assetfinder"),
                subfinder: self.tool("subfinder"),
                dnsx: self.tool("dnsx"),
                httpx: self.tool("httpx"),
            }
        }
    }

    fn settings(fakes: &Fakes, outdir: &Path) -> Settings {
        let mut settings = Settings::new("example.com", outdir);
        settings.tools = fakes.tools();
        settings
    }

    #[tokio::test]
    async fn full_chain_writes_every_artifact() {
        let _guard = process_lock();
        let fakes = Fakes::new(
            "www.example.com\\napi.example.com\\ndead.example.com\\n",
            "WWW.example.com\\nwww.dev.example.com\\n",
        );
        let out = tempfile::tempdir().unwrap();
        let outdir = out.path().join("example.com");

        let outcome = Pipeline::new(settings(&fakes, &outdir)).run().await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Completed(Summary {
                subdomains: 4,
                resolved: 3,
                live: 3,
                filtered: Some(Filtered {
                    label: String::from("200"),
                    kept: 2,
                    path: outdir.join("live-200.txt"),
                }),
            })
        );
        assert_eq!(
            std::fs::read_to_string(outdir.join("subs.txt")).unwrap(),
            "api.example.com\ndead.example.com\nwww.dev.example.com\nwww.example.com\n"
        );
        assert_eq!(
            std::fs::read_to_string(outdir.join("live-200.txt")).unwrap(),
            "https://www.dev.example.com\nhttps://www.example.com\n"
        );
    }

    #[tokio::test]
    async fn no_filter_stops_after_probing() {
        let _guard = process_lock();
        let fakes = Fakes::new("www.example.com\\n", "");
        let out = tempfile::tempdir().unwrap();
        let mut settings = settings(&fakes, out.path());
        settings.filter = None;

        let outcome = Pipeline::new(settings).run().await.unwrap();

        assert!(matches!(
            outcome,
            Outcome::Completed(Summary { live: 1, filtered: None, .. })
        ));
        assert!(out.path().join("live.txt").exists());
        assert!(!out.path().join("live-200.txt").exists());
    }

    #[tokio::test]
    async fn empty_enumeration_halts_before_resolving() {
        let _guard = process_lock();
        let fakes = Fakes::new("\\n  \\n", "");
        let out = tempfile::tempdir().unwrap();

        let outcome = Pipeline::new(settings(&fakes, out.path())).run().await.unwrap();

        assert_eq!(outcome, Outcome::NoSubdomains);
        assert!(!out.path().join("resolved.txt").exists());
        assert!(!out.path().join("live.txt").exists());
    }

    #[tokio::test]
    async fn nothing_resolved_halts_before_probing() {
        let _guard = process_lock();
        let fakes = Fakes::new("dead.example.com\\n", "dead2.example.com\\n");
        let out = tempfile::tempdir().unwrap();

        let outcome = Pipeline::new(settings(&fakes, out.path())).run().await.unwrap();

        assert_eq!(outcome, Outcome::NothingResolved { subdomains: 2 });
        assert!(!out.path().join("live.txt").exists());
    }

    #[tokio::test]
    async fn stale_artifacts_do_not_survive_a_halted_run() {
        let _guard = process_lock();
        let fakes = Fakes::new("", "");
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("live.txt"), "https://old.example.com [200]\n").unwrap();

        let outcome = Pipeline::new(settings(&fakes, out.path())).run().await.unwrap();

        assert_eq!(outcome, Outcome::NoSubdomains);
        assert!(!out.path().join("live.txt").exists());
    }

    #[tokio::test]
    async fn missing_required_tool_fails_before_creating_the_output_directory() {
        let _guard = process_lock();
        let fakes = Fakes::new("www.example.com\\n", "");
        let out = tempfile::tempdir().unwrap();
        let outdir = out.path().join("example.com");
        let mut settings = settings(&fakes, &outdir);
        settings.tools.assetfinder = fakes.tool("not-installed");

        let err = Pipeline::new(settings).run().await.unwrap_err();

        match err {
            Error::MissingTools(missing) => assert_eq!(missing, vec![fakes.tool("not-installed")]),
            other => panic!("unexpected error: {}", other),
        }
        assert!(!outdir.exists());
    }

    #[tokio::test]
    async fn missing_optional_tool_is_not_fatal() {
        let _guard = process_lock();
        let fakes = Fakes::new("www.example.com\\n", "");
        let out = tempfile::tempdir().unwrap();
        let mut settings = settings(&fakes, out.path());
        settings.tools.subfinder = fakes.tool("not-installed");

        let outcome = Pipeline::new(settings).run().await.unwrap();

        assert!(matches!(outcome, Outcome::Completed(Summary { subdomains: 1, .. })));
    }

    #[tokio::test]
    async fn failing_resolver_is_an_error() {
        let _guard = process_lock();
        let fakes = Fakes::new("www.example.com\\n", "");
        fake_tool(fakes.dir.path(), "dnsx", "exit 2");
        let out = tempfile::tempdir().unwrap();

        let err = Pipeline::new(settings(&fakes, out.path())).run().await.unwrap_err();

        assert!(matches!(err, Error::ToolFailed { .. }));
        assert!(!out.path().join("live.txt").exists());
    }

    #[tokio::test]
    async fn failing_prober_is_an_error() {
        let _guard = process_lock();
        let fakes = Fakes::new("www.example.com\\n", "");
        fake_tool(fakes.dir.path(), "httpx", "exit 2");
        let out = tempfile::tempdir().unwrap();

        let err = Pipeline::new(settings(&fakes, out.path())).run().await.unwrap_err();

        assert!(matches!(err, Error::ToolFailed { ref tool, .. } if tool.ends_with("httpx")));
        assert!(out.path().join("resolved.txt").exists());
        assert!(!out.path().join("live.txt").exists());
        assert!(!out.path().join("live-200.txt").exists());
    }

    #[tokio::test]
    async fn failing_assetfinder_aborts_before_resolving() {
        let _guard = process_lock();
        let fakes = Fakes::new("", "www.example.com\\n");
        fake_tool(fakes.dir.path(), "assetfinder", "echo partial.example.com\nexit 1");
        let out = tempfile::tempdir().unwrap();

        let err = Pipeline::new(settings(&fakes, out.path())).run().await.unwrap_err();

        assert!(matches!(
            err,
            Error::ToolFailed { ref tool, .. } if tool.ends_with("assetfinder")
        ));
        assert!(!out.path().join("subs.txt").exists());
        assert!(!out.path().join("resolved.txt").exists());
        assert!(!out.path().join("live.txt").exists());
    }

    #[tokio::test]
    async fn enumerator_output_with_invalid_utf8_is_kept() {
        let _guard = process_lock();
        let fakes = Fakes::new(
            "www.example.com\\nbad\\377.example.com\\napi.example.com\\n",
            "",
        );
        let out = tempfile::tempdir().unwrap();

        let outcome = Pipeline::new(settings(&fakes, out.path())).run().await.unwrap();

        assert!(matches!(outcome, Outcome::Completed(Summary { subdomains: 3, .. })));
        assert_eq!(
            std::fs::read_to_string(out.path().join("subs.txt")).unwrap(),
            "api.example.com\nbad.example.com\nwww.example.com\n"
        );
    }

    #[tokio::test]
    async fn slow_tool_times_out() {
        let _guard = process_lock();
        let fakes = Fakes::new("www.example.com\\n", "");
        fake_tool(fakes.dir.path(), "httpx", "exec sleep 10");
        let out = tempfile::tempdir().unwrap();
        let mut settings = settings(&fakes, out.path());
        settings.timeout = Some(Duration::from_millis(500));

        let outcome = Pipeline::new(settings).run().await.unwrap();

        assert!(matches!(outcome, Outcome::TimedOut { ref tool, .. } if tool.ends_with("httpx")));
    }
}
