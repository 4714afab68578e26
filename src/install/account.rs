//! Service account provisioning.

use log::info;

use super::{Host, InstallerError};

/// What [`ensure_service_account`] found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOutcome {
    Existing,
    Created,
}

/// Make sure the system account `name` exists, creating it at most once.
pub(super) fn ensure_service_account(
    host: &impl Host,
    name: &str,
) -> Result<AccountOutcome, InstallerError> {
    if host.account_exists(name)? {
        info!("Service account {name} already exists");
        return Ok(AccountOutcome::Existing);
    }

    host.create_system_account(name)?;
    info!("Created system account {name}");
    Ok(AccountOutcome::Created)
}
