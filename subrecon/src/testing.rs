//! Helpers shared by the unit tests.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

static PROCESS_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that write executables or spawn processes. Forking while
/// another thread still holds a freshly written script open for writing makes
/// the exec fail with ETXTBSY.
pub fn process_lock() -> MutexGuard<'static, ()> {
    PROCESS_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write an executable `sh` script standing in for an external tool.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
