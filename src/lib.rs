//! Idempotent host provisioning for the parking-scraper service.
//!
//! Prepares a dedicated system account, the `/opt/<service>` layout, the
//! service binary, a default configuration and the systemd unit on a single
//! machine. Re-running is safe: the binary and unit are replaced, while an
//! existing configuration directory is never touched.

pub mod config;
pub mod install;

pub use config::ProvisionConfig;
pub use install::{
    ConfigAction, ConfigOutcome, Host, InstallerError, ProvisionSummary, Provisioner, Step,
    StepError, provision,
};
