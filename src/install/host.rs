//! Access to host state that lives outside the filesystem tree being built.
//!
//! The orchestrator only reaches the identity store, file ownership and the
//! service manager through [`Host`], so every step can run against a fake in
//! tests while file contents and modes are exercised on a real temporary tree.

use std::path::Path;

use super::InstallerError;

pub trait Host {
    /// Whether the running process has administrative privilege.
    fn is_privileged(&self) -> bool;

    /// Whether an account called `name` exists.
    fn account_exists(&self, name: &str) -> Result<bool, InstallerError>;

    /// Create a non-interactive system account (and same-named group).
    fn create_system_account(&self, name: &str) -> Result<(), InstallerError>;

    /// Set owner and group of `path` to the account `name`.
    fn set_owner(&self, path: &Path, name: &str) -> Result<(), InstallerError>;

    /// Ask the service manager to re-read its unit definitions.
    fn reload_units(&self) -> Result<(), InstallerError>;
}
