//! Output and diagnostic file writes
//!
//! Writes go to a temp file in the destination directory and are renamed
//! into place, so a reader never observes a half-written artifact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::JinjaWatchResult;

/// Provenance line placed at the top of every generated file
pub fn provenance_header(template_name: &str) -> String {
    format!("# DO NOT EDIT: Generated from: {}\n", template_name)
}

/// Replace `path` with `content` in a single rename.
pub fn atomic_write(path: &Path, content: &str) -> JinjaWatchResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".jinja-watch-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    // Temp files are created 0600; keep the permissions of the file being replaced
    match fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(_) => set_default_permissions(tmp.as_file())?,
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Remove `path`, returning whether it existed.
pub fn remove_if_exists(path: &Path) -> JinjaWatchResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
