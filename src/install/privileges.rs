//! Privilege gate run before any mutating step.

use super::{Host, InstallerError};

/// Refuse to continue unless the process is privileged.
pub(super) fn check_privileges(host: &impl Host) -> Result<(), InstallerError> {
    if !host.is_privileged() {
        return Err(InstallerError::PermissionDenied(
            "provisioning must run as root (try again with sudo)".to_string(),
        ));
    }
    log::debug!("Running with administrative privilege");
    Ok(())
}
