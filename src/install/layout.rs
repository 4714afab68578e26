//! Directory layout provisioning.
//!
//! Only the directory nodes are touched: they are created when missing and
//! their mode and ownership re-asserted on every run. Entries inside are
//! never read or changed here.

use std::fs::{self, Permissions};
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use log::{debug, info};

use super::{Host, InstallerError};
use crate::config::ProvisionConfig;

/// rwxr-xr-x
pub(super) const DIR_MODE: u32 = 0o755;

/// Ensure the installation root and its config directory.
pub(super) fn ensure_layout(
    host: &impl Host,
    config: &ProvisionConfig,
) -> Result<(), InstallerError> {
    ensure_directory(host, &config.install_root, &config.service_name)?;
    ensure_directory(host, &config.config_dir(), &config.service_name)
}

fn ensure_directory(host: &impl Host, path: &Path, owner: &str) -> Result<(), InstallerError> {
    let resource = format!("directory {}", path.display());

    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => debug!("Directory {} already exists", path.display()),
        Ok(_) => {
            return Err(InstallerError::resource(
                resource,
                "path exists and is not a directory",
            ));
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(|e| InstallerError::resource(&resource, e))?;
            info!("Created directory {}", path.display());
        }
        Err(e) => return Err(InstallerError::resource(resource, e)),
    }

    fs::set_permissions(path, Permissions::from_mode(DIR_MODE))
        .map_err(|e| InstallerError::resource(&resource, format!("cannot set mode: {e}")))?;
    host.set_owner(path, owner)
}
