use std::collections::BTreeSet;

use futures::future;
use tracing::{info, warn};

use crate::{modules::SubdomainModule, runner::Runner, Error};

/// Run every available module concurrently and merge what they found.
///
/// A required module failing aborts the enumeration. Optional modules that
/// are not installed or fail are logged and skipped.
pub async fn enumerate(
    runner: &Runner,
    modules: &[Box<dyn SubdomainModule>],
    domain: &str,
) -> Result<BTreeSet<String>, Error> {
    let runs = modules
        .iter()
        .filter(|module| {
            let available = module.required() || module.is_available();
            if !available {
                info!(
                    "{} not found, skipping (install it for better coverage)",
                    module.program()
                );
            }
            available
        })
        .map(|module| async move { (module, module.enumerate(runner, domain).await) });

    let mut batches = Vec::new();
    for (module, result) in future::join_all(runs).await {
        match result {
            Ok(lines) => {
                info!("{}: {} lines", module.name(), lines.len());
                batches.push(lines);
            }
            Err(err) if module.required() => return Err(err),
            Err(err) => warn!("{}: {}, skipping", module.name(), err),
        }
    }

    Ok(merge(batches))
}

/// Trim, lowercase and deduplicate tool output, dropping empty lines.
pub fn merge<I, B>(batches: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = B>,
    B: IntoIterator<Item = String>,
{
    batches
        .into_iter()
        .flatten()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect()
}
