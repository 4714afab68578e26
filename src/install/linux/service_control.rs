//! Systemd service manager control.

use std::process::Command;

use super::InstallerError;

/// Reload systemd daemon to pick up changes
pub(super) fn reload_systemd_daemon() -> Result<(), InstallerError> {
    reload_with("systemctl")
}

/// Run `<program> daemon-reload`, resolving `program` on the PATH.
fn reload_with(program: &str) -> Result<(), InstallerError> {
    let manager = which::which(program)
        .map_err(|e| InstallerError::Registration(format!("{program} not available: {e}")))?;

    let output = Command::new(manager)
        .arg("daemon-reload")
        .output()
        .map_err(|e| {
            InstallerError::Registration(format!("Failed to execute {program} daemon-reload: {e}"))
        })?;

    if !output.status.success() {
        return Err(InstallerError::Registration(format!(
            "{program} daemon-reload exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}
