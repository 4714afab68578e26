//! Service account management through the system identity store.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use nix::unistd::{Group, User, chown};

use super::InstallerError;

/// Shell used when `nologin` is not on the PATH.
const FALLBACK_NOLOGIN: &str = "/usr/sbin/nologin";

pub(super) fn account_exists(name: &str) -> Result<bool, InstallerError> {
    User::from_name(name).map(|user| user.is_some()).map_err(|e| {
        InstallerError::resource(format!("account {name}"), format!("lookup failed: {e}"))
    })
}

/// Create a system account with no login shell and no home directory.
pub(super) fn create_system_account(name: &str) -> Result<(), InstallerError> {
    let resource = format!("account {name}");
    let useradd = which::which("useradd")
        .map_err(|e| InstallerError::resource(&resource, format!("useradd not available: {e}")))?;
    let shell = which::which("nologin").unwrap_or_else(|_| PathBuf::from(FALLBACK_NOLOGIN));
    let group_exists = Group::from_name(name)
        .map_err(|e| InstallerError::resource(&resource, format!("group lookup failed: {e}")))?
        .is_some();

    let output = Command::new(useradd)
        .args(useradd_args(name, &shell, group_exists))
        .output()
        .map_err(|e| {
            InstallerError::resource(&resource, format!("failed to execute useradd: {e}"))
        })?;

    if !output.status.success() {
        return Err(InstallerError::resource(
            resource,
            format!(
                "useradd exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }

    Ok(())
}

/// Arguments for `useradd`. A group left behind by an earlier partial setup
/// is joined instead of created, since `--user-group` refuses to reuse it.
fn useradd_args(name: &str, shell: &Path, group_exists: bool) -> Vec<OsString> {
    let mut args = vec![OsString::from("--system")];
    if group_exists {
        args.push(OsString::from("--gid"));
        args.push(OsString::from(name));
    } else {
        args.push(OsString::from("--user-group"));
    }
    args.push(OsString::from("--no-create-home"));
    args.push(OsString::from("--shell"));
    args.push(shell.as_os_str().to_owned());
    args.push(OsString::from(name));
    args
}

/// Give `path` to the account `name` and its same-named group.
pub(super) fn chown_to_account(path: &Path, name: &str) -> Result<(), InstallerError> {
    let resource = format!("ownership of {}", path.display());

    let user = User::from_name(name)
        .map_err(|e| InstallerError::resource(&resource, e))?
        .ok_or_else(|| InstallerError::resource(&resource, format!("no such account {name}")))?;

    // useradd --user-group creates the group; fall back to the primary group otherwise
    let gid = match Group::from_name(name).map_err(|e| InstallerError::resource(&resource, e))? {
        Some(group) => group.gid,
        None => user.gid,
    };

    chown(path, Some(user.uid), Some(gid)).map_err(|e| InstallerError::resource(resource, e))
}
