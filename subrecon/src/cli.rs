use std::{path::Path, time::Instant};

use tokio::runtime::Runtime;
use tracing::info;

use crate::{
    args::{ScanArgs, ToolArgs},
    artifacts,
    config::{Settings, Tools},
    filter::{StatusCode, StatusFilter},
    modules,
    pipeline::{Outcome, Pipeline},
    runner, Error,
};

fn runtime() -> Result<Runtime, Error> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

pub fn scan(args: ScanArgs) -> Result<(), Error> {
    let settings = Settings::try_from(args)?;
    let domain = settings.domain.clone();
    info!("scanning {} into {}", settings.domain, settings.outdir.display());

    let scan_start = Instant::now();
    let pipeline = Pipeline::new(settings);
    let outcome = runtime()?.block_on(pipeline.run())?;
    let scan_duration = scan_start.elapsed();
    info!("chain finished in {:?}", scan_duration);

    match outcome {
        Outcome::Completed(summary) => {
            println!(
                "\n[✓] {} subdomains, {} resolved, {} live",
                summary.subdomains, summary.resolved, summary.live
            );
            if let Some(filtered) = summary.filtered {
                println!(
                    "[✓] {} URL(s) with statuses [{}] -> {}",
                    filtered.kept,
                    filtered.label,
                    filtered.path.display()
                );
            }
            println!("[✓] Results in {}/", pipeline.output().root().display());
        }
        Outcome::NoSubdomains => info!("{}: nothing to resolve", domain),
        Outcome::NothingResolved { subdomains } => {
            info!("{}: none of {} subdomains resolved", domain, subdomains)
        }
        Outcome::NoLiveHosts {
            subdomains,
            resolved,
        } => info!(
            "{}: {} subdomains, {} resolved, none answered over HTTP",
            domain, subdomains, resolved
        ),
        Outcome::TimedOut { tool, after } => {
            println!("[!] {} timed out after {}s, stopping.", tool, after.as_secs())
        }
    }

    Ok(())
}

pub fn filter(input: &Path, output: &Path, codes: Vec<StatusCode>) -> Result<(), Error> {
    let filter = StatusFilter::new(codes)?;
    let kept = runtime()?.block_on(filter.filter_file(input, output))?;

    println!(
        "[✓] {} URL(s) with statuses [{}] saved to {}",
        kept,
        filter.label(),
        output.display()
    );
    Ok(())
}

pub fn clean(dir: &Path) -> Result<(), Error> {
    println!("[*] Cleaning {}/", dir.display());

    let report = artifacts::clean(dir)?;
    for name in &report.removed {
        println!("  [-] Removed: {}", name);
    }
    for name in &report.missing {
        println!("  [ ] Skipped missing: {}", name);
    }

    if report.removed.is_empty() {
        println!("  [*] Nothing to clean.");
    } else {
        println!("[✓] Removed {} file(s).", report.removed.len());
    }
    Ok(())
}

pub fn tools(args: ToolArgs) {
    let tools = Tools::from(args);

    println!("Tools:");
    let listing = tools
        .required()
        .into_iter()
        .map(|tool| (tool, "required"))
        .chain(tools.optional().into_iter().map(|tool| (tool, "optional")));
    for (tool, kind) in listing {
        match runner::find_executable(tool) {
            Some(path) => println!("  [+] {:<14} {:<9} {}", tool, kind, path.display()),
            None => println!("  [!] {:<14} {:<9} not found", tool, kind),
        }
    }

    println!("\nSubdomain modules:");
    for module in modules::all_subdomains_modules(&tools) {
        println!("  {:<24}{}", module.name(), module.description());
    }
}
