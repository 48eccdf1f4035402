// JSON file plumbing shared by the stores in the config directory.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, StoreError};

/// Reads and parses a JSON file. `Ok(None)` when the file does not exist.
pub async fn read_json(path: &Path) -> Result<Option<Value>> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    if !exists {
        return Ok(None);
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    let value = serde_json::from_str(&text).map_err(|e| StoreError::json(path, e))?;
    Ok(Some(value))
}

/// Writes `value` as 2-space indented JSON with a trailing newline, replacing the file.
pub async fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = render(path, value)?;
    let tmp_path = tmp_path(path);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    // Atomic write: tmp + rename
    tokio::fs::write(&tmp_path, json)
        .await
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

/// Blocking counterpart of [`write_pretty`] for synchronous storage adapters.
pub fn write_pretty_blocking<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = render(path, value)?;
    let tmp_path = tmp_path(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    fs::write(&tmp_path, json).map_err(|e| StoreError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

fn render<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| StoreError::json(path, e))?;
    json.push('\n');
    Ok(json)
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// Unique per write so overlapping saves never rename each other's temp file.
fn tmp_path(path: &Path) -> PathBuf {
    let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    path.with_file_name(name)
}
