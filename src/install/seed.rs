//! Default configuration seeding.
//!
//! The config directory is seeded only while it is completely empty. Any
//! entry at all (dotfiles and leftovers included) means an operator or an
//! earlier run already owns the configuration, and the directory is left
//! exactly as it is.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::InstallerError;
use super::file_ops::copy_file_atomic;
use crate::config::ProvisionConfig;

/// rw-r--r--
pub(super) const CONFIG_MODE: u32 = 0o644;

/// Decision taken for the config directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Seed,
    Skip,
}

/// Result of the seeding step, used by the completion report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    Seeded(PathBuf),
    Skipped { entries: Vec<OsString> },
}

/// Seed only an empty directory.
pub fn decide(entries: &[OsString]) -> ConfigAction {
    if entries.is_empty() {
        ConfigAction::Seed
    } else {
        ConfigAction::Skip
    }
}

/// Names of all entries in `dir`, hidden ones included.
pub(super) fn list_entries(dir: &Path) -> Result<Vec<OsString>, InstallerError> {
    let reader = fs::read_dir(dir)
        .map_err(|e| InstallerError::copy(dir, format!("cannot list directory: {e}")))?;

    let mut names = Vec::new();
    for entry in reader {
        let entry =
            entry.map_err(|e| InstallerError::copy(dir, format!("cannot list directory: {e}")))?;
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

/// Copy the default configuration into the config directory if it is empty.
pub(super) fn install_default_config(
    config: &ProvisionConfig,
) -> Result<ConfigOutcome, InstallerError> {
    let dir = config.config_dir();
    let entries = list_entries(&dir)?;

    match decide(&entries) {
        ConfigAction::Skip => {
            warn!(
                "{} is not empty ({} entries), keeping existing configuration",
                dir.display(),
                entries.len()
            );
            Ok(ConfigOutcome::Skipped { entries })
        }
        ConfigAction::Seed => {
            let dest = config.config_file();
            copy_file_atomic(&config.default_config, &dest, CONFIG_MODE)?;
            info!("Seeded default configuration at {}", dest.display());
            Ok(ConfigOutcome::Seeded(dest))
        }
    }
}
