//! Crash-safe file replacement shared by the cache and the rating store

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling temp file a write goes to before it replaces `path`
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes to a sibling temp file and renames it over the target, so a crash
/// leaves either the old contents or the new ones, never a truncated file.
pub(crate) fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = temp_path(path);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
