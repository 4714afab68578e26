//! Linux host backed by the local identity store and systemd.
//!
//! # Module Structure
//!
//! - `accounts` - account lookup, `useradd` and ownership changes
//! - `service_control` - `systemctl` invocation

mod accounts;
mod service_control;

use std::path::Path;

use super::{Host, InstallerError};

/// The machine the provisioner runs on.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxHost;

impl LinuxHost {
    pub fn new() -> Self {
        Self
    }
}

impl Host for LinuxHost {
    fn is_privileged(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    fn account_exists(&self, name: &str) -> Result<bool, InstallerError> {
        accounts::account_exists(name)
    }

    fn create_system_account(&self, name: &str) -> Result<(), InstallerError> {
        accounts::create_system_account(name)
    }

    fn set_owner(&self, path: &Path, name: &str) -> Result<(), InstallerError> {
        accounts::chown_to_account(path, name)
    }

    fn reload_units(&self) -> Result<(), InstallerError> {
        service_control::reload_systemd_daemon()
    }
}
