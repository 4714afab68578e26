//! Systemd unit registration.
//!
//! Unit files are system configuration, not operator configuration: the
//! shipped definition always replaces whatever is installed, then the
//! manager is told to re-read its units.

use std::fs;

use log::info;

use super::file_ops::copy_file_atomic;
use super::{Host, InstallerError};
use crate::config::ProvisionConfig;

/// rw-r--r--
pub(super) const UNIT_MODE: u32 = 0o644;

/// Install the unit file and reload the service manager.
pub(super) fn register_unit(
    host: &impl Host,
    config: &ProvisionConfig,
) -> Result<(), InstallerError> {
    let unit_path = config.unit_path();

    // Create parent directory if it doesn't exist
    fs::create_dir_all(&config.unit_dir).map_err(|e| {
        InstallerError::copy(&config.unit_dir, format!("cannot create unit directory: {e}"))
    })?;

    copy_file_atomic(&config.unit_file, &unit_path, UNIT_MODE)?;
    info!("Installed unit file {}", unit_path.display());

    host.reload_units()?;
    info!("Service manager reloaded {}", config.unit_name());
    Ok(())
}
