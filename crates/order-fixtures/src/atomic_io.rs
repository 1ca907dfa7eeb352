//! Atomic file writes for the fixture output.
//!
//! Content goes to a hidden temporary file beside the target, is synced,
//! then renamed over the target. Readers never observe a half-written
//! fixture file, and the temporary file is removed on every failure path.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::error::WriteError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes `contents` to `path` inside `dir` using a temp file and rename.
///
/// `path` must be a single file name relative to `dir`.
///
/// # Errors
///
/// Returns [`WriteError::Io`] if the path is not a plain file name or any
/// step of the write fails.
pub(crate) fn write_atomic(dir: &Dir, path: &Utf8Path, contents: &[u8]) -> Result<(), WriteError> {
    let mut components = path.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(WriteError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "output path must be a file"),
        });
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{}.tmp.{}.{}.{}",
        file_name,
        std::process::id(),
        suffix,
        counter
    );

    write_to_temp_file(dir, &tmp_name, path, contents)?;
    rename_temp_to_target(dir, &tmp_name, file_name, path)?;
    sync_parent_directory(dir);

    Ok(())
}

fn write_to_temp_file(
    dir: &Dir,
    tmp_name: &str,
    target_path: &Utf8Path,
    contents: &[u8],
) -> Result<(), WriteError> {
    let tmp_path = target_path.with_file_name(tmp_name);
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir
        .open_with(tmp_name, &options)
        .map_err(|source| WriteError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    let written = file.write_all(contents).and_then(|()| file.sync_all());
    if let Err(source) = written {
        drop(file);
        drop(dir.remove_file(tmp_name));
        return Err(WriteError::Io {
            path: tmp_path,
            source,
        });
    }

    Ok(())
}

fn rename_temp_to_target(
    dir: &Dir,
    tmp_name: &str,
    target_name: &str,
    target_path: &Utf8Path,
) -> Result<(), WriteError> {
    replace_target(dir, tmp_name, target_name).map_err(|source| {
        drop(dir.remove_file(tmp_name));
        WriteError::Io {
            path: target_path.to_path_buf(),
            source,
        }
    })
}

#[cfg(windows)]
fn replace_target(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists, so remove it first.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn replace_target(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

/// Flushes the rename to disk where the platform allows it.
fn sync_parent_directory(parent: &Dir) {
    let synced = parent.open(".").and_then(|dir| dir.sync_all());
    drop(synced);
}
