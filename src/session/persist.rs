//! Client-local storage: small JSON records under the configured
//! storage directory (credentials, pending assessment). Failures are
//! logged and swallowed so a broken disk never takes the client down.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const SESSION_FILE: &str = "session.json";
pub const PENDING_ASSESSMENT_FILE: &str = "pending_assessment.json";

static STORAGE_DIR: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

/// Points persistence at `dir`, creating it if needed. Called once at
/// startup; before this, reads return `None` and writes are dropped.
pub fn init(dir: &Path) {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Failed to create storage dir {}: {}", dir.display(), e);
        return;
    }
    *STORAGE_DIR.lock() = Some(dir.to_path_buf());
    debug!("Client storage at {}", dir.display());
}

fn path_for(name: &str) -> Option<PathBuf> {
    STORAGE_DIR.lock().as_ref().map(|dir| dir.join(name))
}

pub fn write_json<T: Serialize>(name: &str, value: &T) {
    let Some(path) = path_for(name) else {
        warn!("Storage not initialized, dropping write of {}", name);
        return;
    };
    match serde_json::to_string_pretty(value) {
        Ok(body) => {
            if let Err(e) = fs::write(&path, body) {
                warn!("Failed to write {}: {}", path.display(), e);
            }
        }
        Err(e) => warn!("Failed to serialize {}: {}", name, e),
    }
}

pub fn read_json<T: DeserializeOwned>(name: &str) -> Option<T> {
    let path = path_for(name)?;
    let body = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&body) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt record {}: {}", path.display(), e);
            None
        }
    }
}

pub fn remove(name: &str) {
    if let Some(path) = path_for(name) {
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

/// Serializes tests that repoint the storage directory.
#[cfg(test)]
pub(crate) static TEST_STORAGE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[cfg(test)]
pub(crate) fn init_test_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("visapath-test-{}", uuid::Uuid::new_v4()));
    init(&dir);
    dir
}
