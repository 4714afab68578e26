use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Name of the service provisioned when no manifest overrides it.
pub const DEFAULT_SERVICE_NAME: &str = "parking-scraper";

/// Fallback name of the seeded configuration file.
const DEFAULT_CONFIG_NAME: &str = "default.toml";

/// Longest account name `useradd` accepts.
const MAX_ACCOUNT_NAME: usize = 32;

/// Provisioning manifest (defaults match the production layout).
///
/// Every field may be overridden from a TOML file; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Service name, also used for the account, the binary and the unit.
    pub service_name: String,
    /// Installation root, owned by the service account.
    pub install_root: PathBuf,
    /// System-wide unit directory of the service manager.
    pub unit_dir: PathBuf,
    /// Built binary to install.
    pub artifact: PathBuf,
    /// Default configuration template seeded into an empty config directory.
    pub default_config: PathBuf,
    /// Unit definition copied into `unit_dir`.
    pub unit_file: PathBuf,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.into(),
            install_root: PathBuf::from("/opt").join(DEFAULT_SERVICE_NAME),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            artifact: PathBuf::from("target/release").join(DEFAULT_SERVICE_NAME),
            default_config: PathBuf::from("config").join(DEFAULT_CONFIG_NAME),
            unit_file: PathBuf::from("deploy").join(format!("{DEFAULT_SERVICE_NAME}.service")),
        }
    }
}

impl ProvisionConfig {
    /// Load the manifest at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read manifest {}", path.display()))?;
                toml::from_str::<Self>(&raw)
                    .with_context(|| format!("Failed to parse manifest {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let name = &self.service_name;
        if name.is_empty() {
            bail!("service_name must not be empty");
        }
        if name.len() > MAX_ACCOUNT_NAME {
            bail!("service_name {name:?} is longer than {MAX_ACCOUNT_NAME} characters");
        }
        if name.starts_with(['-', '.'])
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            bail!("service_name {name:?} is not a valid account name");
        }
        if !self.install_root.is_absolute() {
            bail!(
                "install_root must be absolute, got {}",
                self.install_root.display()
            );
        }
        if !self.unit_dir.is_absolute() {
            bail!("unit_dir must be absolute, got {}", self.unit_dir.display());
        }
        if self.default_config.file_name().is_none() {
            bail!(
                "default_config {} does not name a file",
                self.default_config.display()
            );
        }
        Ok(())
    }

    /// `<root>/<service>`
    pub fn binary_path(&self) -> PathBuf {
        self.install_root.join(&self.service_name)
    }

    /// `<root>/config`
    pub fn config_dir(&self) -> PathBuf {
        self.install_root.join("config")
    }

    /// Destination of the seeded configuration file.
    pub fn config_file(&self) -> PathBuf {
        let name = self
            .default_config
            .file_name()
            .unwrap_or(OsStr::new(DEFAULT_CONFIG_NAME));
        self.config_dir().join(name)
    }

    pub fn unit_name(&self) -> String {
        format!("{}.service", self.service_name)
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.unit_name())
    }

    /// Command the operator runs to enable and start the service.
    pub fn enable_command(&self) -> String {
        format!("systemctl enable --now {}", self.service_name)
    }
}
