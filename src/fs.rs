use anyhow::Context;
use anyhow::Result;
use std::path::Path;
use std::time::SystemTime;

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Removes the file at `path`. Succeeds if it didn't exist.
pub(crate) fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Err(error) if error.kind() != std::io::ErrorKind::NotFound => {
            Err(error).with_context(|| format!("Unable to delete `{}`", path.display()))
        }
        _ => Ok(()),
    }
}

pub(crate) fn modification_time(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .with_context(|| format!("Failed to get modification time of `{}`", path.display()))
}
