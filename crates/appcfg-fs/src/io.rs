//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Content goes to a sibling temp file which is renamed over the target,
/// so readers never observe a partially written artifact.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Write text only when it differs from what is already on disk.
///
/// Returns `true` when the file was written.
pub fn write_text_if_changed(path: &NormalizedPath, content: &str) -> Result<bool> {
    if path.is_file() && read_text(path)? == content {
        return Ok(false);
    }
    write_text(path, content)?;
    Ok(true)
}

/// Copy `from` over `to`, creating parent directories as needed.
///
/// The destination is always overwritten.
pub fn copy_file(from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
    let bytes = fs::read(from.to_native()).map_err(|source| Error::Copy {
        from: from.to_native(),
        to: to.to_native(),
        source,
    })?;
    write_atomic(to, &bytes).map_err(|e| match e {
        Error::Io { source, .. } => Error::Copy {
            from: from.to_native(),
            to: to.to_native(),
            source,
        },
        other => other,
    })?;
    tracing::debug!(from = %from, to = %to, "Copied file");
    Ok(())
}
