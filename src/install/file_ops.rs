//! Atomic file installation.
//!
//! Files are copied to a hidden sibling, synced, given their final mode and
//! renamed over the destination, so a destination is either the old file or
//! the complete new one. The rename also gives every install a fresh inode.

use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use super::InstallerError;

/// Copy `src` over `dst` atomically with permission bits `mode`.
///
/// Failures reading `src` are reported against `src`; everything after that
/// is reported against `dst`.
pub(super) fn copy_file_atomic(src: &Path, dst: &Path, mode: u32) -> Result<(), InstallerError> {
    let contents =
        fs::read(src).map_err(|e| InstallerError::copy(src, format!("cannot read source: {e}")))?;

    let temp_path = temp_sibling(dst)?;
    let written = write_temp(&contents, &temp_path, mode);
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(InstallerError::copy(dst, format!("cannot write destination: {e}")));
    }

    fs::rename(&temp_path, dst).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        InstallerError::copy(dst, format!("cannot move file into place: {e}"))
    })
}

fn write_temp(contents: &[u8], temp_path: &Path, mode: u32) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(contents)?;
    // set explicitly, File::create is subject to the umask
    file.set_permissions(Permissions::from_mode(mode))?;
    file.sync_all()
}

fn temp_sibling(dst: &Path) -> Result<PathBuf, InstallerError> {
    let name = dst
        .file_name()
        .ok_or_else(|| InstallerError::copy(dst, "destination has no file name"))?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(".tmp");
    Ok(dst.with_file_name(temp_name))
}

/// Permission bits of `path`, without the file type.
#[cfg(test)]
pub(crate) fn mode_of(path: &Path) -> u32 {
    fs::metadata(path).map(|m| m.permissions().mode() & 0o7777).unwrap_or(0)
}
