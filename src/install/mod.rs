//! Provisioning pipeline.
//!
//! A run is a fixed chain of idempotent steps:
//!
//! 1. privilege check
//! 2. service account
//! 3. directory layout
//! 4. binary installation
//! 5. configuration seeding (only into an empty config directory)
//! 6. unit registration and service manager reload
//!
//! followed by the completion report. The first failing step ends the run;
//! nothing is retried and completed steps are not rolled back.

mod account;
mod artifact;
mod error;
mod file_ops;
mod host;
mod layout;
mod privileges;
pub mod report;
pub mod seed;
mod unit;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod linux;
        pub use linux::LinuxHost;
    }
}

pub use account::AccountOutcome;
pub use error::{
    EXIT_CONFIG, EXIT_COPY, EXIT_PERMISSION_DENIED, EXIT_REGISTRATION, EXIT_RESOURCE_CREATION,
    InstallerError, Step, StepError,
};
pub use host::Host;
pub use seed::{ConfigAction, ConfigOutcome};

use log::info;
use termcolor::WriteColor;

use crate::config::ProvisionConfig;
use error::at;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub account: AccountOutcome,
    pub config: ConfigOutcome,
}

/// Runs the provisioning steps against a host.
pub struct Provisioner<'a, H: Host> {
    host: &'a H,
    config: &'a ProvisionConfig,
}

impl<'a, H: Host> Provisioner<'a, H> {
    pub fn new(host: &'a H, config: &'a ProvisionConfig) -> Self {
        Self { host, config }
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&self) -> Result<ProvisionSummary, StepError> {
        let (host, config) = (self.host, self.config);
        info!("Provisioning {}", config.service_name);

        begin(Step::Privileges);
        privileges::check_privileges(host).map_err(at(Step::Privileges))?;

        begin(Step::Account);
        let account = account::ensure_service_account(host, &config.service_name)
            .map_err(at(Step::Account))?;

        begin(Step::Layout);
        layout::ensure_layout(host, config).map_err(at(Step::Layout))?;

        begin(Step::Artifact);
        artifact::install_artifact(host, config).map_err(at(Step::Artifact))?;

        begin(Step::Config);
        let seeded = seed::install_default_config(config).map_err(at(Step::Config))?;

        begin(Step::Registration);
        unit::register_unit(host, config).map_err(at(Step::Registration))?;

        info!("Provisioning of {} complete", config.service_name);
        Ok(ProvisionSummary {
            account,
            config: seeded,
        })
    }
}

fn begin(step: Step) {
    info!("Starting {step}");
}

/// Provision the host and print the completion guidance to `out`.
///
/// The report is only printed when every step succeeded.
pub fn provision<H: Host, W: WriteColor>(
    host: &H,
    config: &ProvisionConfig,
    out: &mut W,
) -> Result<ProvisionSummary, StepError> {
    let summary = Provisioner::new(host, config).run()?;
    report::show_completion(out, config, &summary);
    Ok(summary)
}
