//! Binary installation.

use log::info;

use super::file_ops::copy_file_atomic;
use super::{Host, InstallerError};
use crate::config::ProvisionConfig;

/// rwxr-xr-x
pub(super) const BINARY_MODE: u32 = 0o755;

/// Copy the built artifact to `<root>/<service>`, replacing any previous binary.
pub(super) fn install_artifact(
    host: &impl Host,
    config: &ProvisionConfig,
) -> Result<(), InstallerError> {
    let dest = config.binary_path();
    copy_file_atomic(&config.artifact, &dest, BINARY_MODE)?;
    host.set_owner(&dest, &config.service_name)?;
    info!(
        "Installed {} to {}",
        config.artifact.display(),
        dest.display()
    );
    Ok(())
}
