//! End-to-end runs of the provisioning pipeline against a fake host and a
//! temporary filesystem tree.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use parking_provision::install::{AccountOutcome, EXIT_PERMISSION_DENIED};
use parking_provision::{
    ConfigOutcome, Host, InstallerError, ProvisionConfig, ProvisionSummary, Step, StepError,
    provision,
};
use tempfile::TempDir;
use termcolor::NoColor;

const BINARY: &[u8] = b"\x7fELF parking-scraper build";
const DEFAULT_CONFIG: &str = "[api]\nurl = \"https://api.example.com\"\nscraping_interval_secs = 60\n";
const UNIT: &str = "[Service]\nExecStart=/opt/parking-scraper/parking-scraper\n";

#[derive(Default)]
struct FakeHost {
    unprivileged: bool,
    accounts: RefCell<BTreeSet<String>>,
    created: RefCell<Vec<String>>,
    owned: RefCell<Vec<(PathBuf, String)>>,
    reloads: Cell<usize>,
    reload_failure: Option<String>,
    account_store_down: bool,
}

impl Host for FakeHost {
    fn is_privileged(&self) -> bool {
        !self.unprivileged
    }

    fn account_exists(&self, name: &str) -> Result<bool, InstallerError> {
        Ok(self.accounts.borrow().contains(name))
    }

    fn create_system_account(&self, name: &str) -> Result<(), InstallerError> {
        if self.account_store_down {
            return Err(InstallerError::ResourceCreation {
                resource: format!("account {name}"),
                reason: "identity store unavailable".into(),
            });
        }
        assert!(
            self.accounts.borrow_mut().insert(name.to_string()),
            "account {name} created twice"
        );
        self.created.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn set_owner(&self, path: &Path, name: &str) -> Result<(), InstallerError> {
        assert!(path.exists(), "chown on missing {}", path.display());
        self.owned
            .borrow_mut()
            .push((path.to_path_buf(), name.to_string()));
        Ok(())
    }

    fn reload_units(&self) -> Result<(), InstallerError> {
        if let Some(diagnostic) = &self.reload_failure {
            return Err(InstallerError::Registration(diagnostic.clone()));
        }
        self.reloads.set(self.reloads.get() + 1);
        Ok(())
    }
}

impl FakeHost {
    fn owners_of(&self, path: &Path) -> Vec<String> {
        self.owned
            .borrow()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, name)| name.clone())
            .collect()
    }
}

/// Sources in `<tmp>/src`, install root and unit dir under `<tmp>`.
fn fixture() -> (TempDir, ProvisionConfig) {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("parking-scraper"), BINARY).unwrap();
    fs::write(src.join("default.toml"), DEFAULT_CONFIG).unwrap();
    fs::write(src.join("parking-scraper.service"), UNIT).unwrap();

    let config = ProvisionConfig {
        install_root: tmp.path().join("opt/parking-scraper"),
        unit_dir: tmp.path().join("etc/systemd/system"),
        artifact: src.join("parking-scraper"),
        default_config: src.join("default.toml"),
        unit_file: src.join("parking-scraper.service"),
        ..ProvisionConfig::default()
    };
    (tmp, config)
}

fn run(host: &FakeHost, config: &ProvisionConfig) -> (Result<ProvisionSummary, StepError>, String) {
    let mut out = NoColor::new(Vec::new());
    let result = provision(host, config, &mut out);
    (result, String::from_utf8(out.into_inner()).unwrap())
}

fn mode(path: &Path) -> u32 {
    fs::metadata(path).unwrap().permissions().mode() & 0o7777
}

fn inode(path: &Path) -> u64 {
    fs::metadata(path).unwrap().ino()
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn fresh_host_is_fully_provisioned() {
    let (_tmp, config) = fixture();
    let host = FakeHost::default();

    let (result, output) = run(&host, &config);
    let summary = result.unwrap();

    assert_eq!(summary.account, AccountOutcome::Created);
    assert_eq!(summary.config, ConfigOutcome::Seeded(config.config_file()));
    assert_eq!(*host.created.borrow(), vec!["parking-scraper".to_string()]);

    assert_eq!(mode(&config.install_root), 0o755);
    assert_eq!(mode(&config.config_dir()), 0o755);

    let binary = config.binary_path();
    assert_eq!(fs::read(&binary).unwrap(), BINARY);
    assert_eq!(mode(&binary), 0o755);

    let seeded = config.config_dir().join("default.toml");
    assert_eq!(fs::read_to_string(&seeded).unwrap(), DEFAULT_CONFIG);
    assert_eq!(mode(&seeded), 0o644);
    assert_eq!(entries(&config.config_dir()), vec!["default.toml"]);

    let unit = config.unit_dir.join("parking-scraper.service");
    assert_eq!(fs::read_to_string(&unit).unwrap(), UNIT);
    assert_eq!(mode(&unit), 0o644);
    assert_eq!(host.reloads.get(), 1);

    assert!(output.contains("installed successfully"));
    assert!(output.contains(&seeded.display().to_string()));
    assert!(output.contains("systemctl enable --now parking-scraper"));
}

#[test]
fn ownership_goes_to_the_service_account_except_config_file_and_unit() {
    let (_tmp, config) = fixture();
    let host = FakeHost::default();

    run(&host, &config).0.unwrap();

    for path in [&config.install_root, &config.config_dir(), &config.binary_path()] {
        assert_eq!(host.owners_of(path), vec!["parking-scraper".to_string()]);
    }
    assert!(host.owners_of(&config.config_file()).is_empty());
    assert!(host.owners_of(&config.unit_path()).is_empty());
}

#[test]
fn second_run_keeps_edited_config_and_replaces_binary_and_unit() {
    let (_tmp, config) = fixture();
    let host = FakeHost::default();
    run(&host, &config).0.unwrap();

    let edited = "[api]\nurl = \"https://parking.internal\"\n";
    fs::write(config.config_file(), edited).unwrap();
    let binary_before = inode(&config.binary_path());
    let unit_before = inode(&config.unit_path());

    let (result, output) = run(&host, &config);
    let summary = result.unwrap();

    assert_eq!(summary.account, AccountOutcome::Existing);
    assert!(matches!(summary.config, ConfigOutcome::Skipped { .. }));
    assert_eq!(fs::read_to_string(config.config_file()).unwrap(), edited);
    assert_eq!(entries(&config.config_dir()), vec!["default.toml"]);

    assert_ne!(inode(&config.binary_path()), binary_before);
    assert_ne!(inode(&config.unit_path()), unit_before);
    assert_eq!(fs::read(config.binary_path()).unwrap(), BINARY);
    assert_eq!(host.reloads.get(), 2);
    assert_eq!(host.created.borrow().len(), 1);
    assert!(output.contains("kept existing"));
}

#[test]
fn repeated_runs_converge_to_the_same_state() {
    let (_tmp, config) = fixture();
    let host = FakeHost::default();

    run(&host, &config).0.unwrap();
    let once = (
        entries(&config.install_root),
        entries(&config.config_dir()),
        entries(&config.unit_dir),
        fs::read_to_string(config.config_file()).unwrap(),
    );
    run(&host, &config).0.unwrap();
    run(&host, &config).0.unwrap();
    let thrice = (
        entries(&config.install_root),
        entries(&config.config_dir()),
        entries(&config.unit_dir),
        fs::read_to_string(config.config_file()).unwrap(),
    );

    assert_eq!(once, thrice);
    assert_eq!(*host.accounts.borrow(), BTreeSet::from(["parking-scraper".to_string()]));
    assert_eq!(mode(&config.install_root), 0o755);
}

#[test]
fn any_preexisting_entry_blocks_seeding() {
    let (_tmp, config) = fixture();
    fs::create_dir_all(config.config_dir()).unwrap();
    fs::write(config.config_dir().join(".placeholder"), "").unwrap();
    let host = FakeHost::default();

    let summary = run(&host, &config).0.unwrap();

    assert_eq!(
        summary.config,
        ConfigOutcome::Skipped {
            entries: vec![".placeholder".into()]
        }
    );
    assert_eq!(entries(&config.config_dir()), vec![".placeholder"]);
    assert_eq!(fs::read(config.config_dir().join(".placeholder")).unwrap(), b"");
}

#[test]
fn emptied_config_directory_is_seeded_again() {
    let (_tmp, config) = fixture();
    let host = FakeHost::default();
    run(&host, &config).0.unwrap();

    fs::remove_file(config.config_file()).unwrap();
    let summary = run(&host, &config).0.unwrap();

    assert_eq!(summary.config, ConfigOutcome::Seeded(config.config_file()));
    assert_eq!(fs::read_to_string(config.config_file()).unwrap(), DEFAULT_CONFIG);
}

#[test]
fn existing_directories_get_mode_reasserted_without_touching_contents() {
    let (_tmp, config) = fixture();
    fs::create_dir_all(&config.install_root).unwrap();
    fs::set_permissions(&config.install_root, fs::Permissions::from_mode(0o700)).unwrap();
    fs::write(config.install_root.join("data.db"), "rows").unwrap();
    let host = FakeHost {
        accounts: RefCell::new(BTreeSet::from(["parking-scraper".to_string()])),
        ..FakeHost::default()
    };

    let summary = run(&host, &config).0.unwrap();

    assert_eq!(summary.account, AccountOutcome::Existing);
    assert!(host.created.borrow().is_empty());
    assert_eq!(mode(&config.install_root), 0o755);
    assert_eq!(
        fs::read_to_string(config.install_root.join("data.db")).unwrap(),
        "rows"
    );
}

#[test]
fn unprivileged_run_changes_nothing() {
    let (tmp, config) = fixture();
    let host = FakeHost {
        unprivileged: true,
        ..FakeHost::default()
    };

    let (result, output) = run(&host, &config);
    let err = result.unwrap_err();

    assert_eq!(err.step, Step::Privileges);
    assert!(err.is_permission_denied());
    assert_eq!(err.exit_code(), EXIT_PERMISSION_DENIED);
    assert!(host.created.borrow().is_empty());
    assert!(host.owned.borrow().is_empty());
    assert_eq!(host.reloads.get(), 0);
    assert_eq!(entries(tmp.path()), vec!["src"]);
    assert!(output.is_empty());
}

#[test]
fn account_creation_failure_stops_before_layout() {
    let (_tmp, config) = fixture();
    let host = FakeHost {
        account_store_down: true,
        ..FakeHost::default()
    };

    let err = run(&host, &config).0.unwrap_err();

    assert_eq!(err.step, Step::Account);
    assert!(matches!(err.source, InstallerError::ResourceCreation { .. }));
    assert!(!config.install_root.exists());
}

#[test]
fn install_root_blocked_by_a_file_fails_the_layout_step() {
    let (_tmp, config) = fixture();
    fs::create_dir_all(config.install_root.parent().unwrap()).unwrap();
    fs::write(&config.install_root, "not a directory").unwrap();
    let host = FakeHost::default();

    let err = run(&host, &config).0.unwrap_err();

    assert_eq!(err.step, Step::Layout);
    assert!(matches!(err.source, InstallerError::ResourceCreation { .. }));
    assert_eq!(
        fs::read_to_string(&config.install_root).unwrap(),
        "not a directory"
    );
}

#[test]
fn missing_artifact_aborts_remaining_steps() {
    let (_tmp, mut config) = fixture();
    config.artifact = config.artifact.with_file_name("not-built");
    let host = FakeHost::default();

    let (result, output) = run(&host, &config);
    let err = result.unwrap_err();

    assert_eq!(err.step, Step::Artifact);
    assert!(matches!(err.source, InstallerError::Copy { .. }));
    assert!(err.to_string().contains("not-built"));
    assert!(entries(&config.config_dir()).is_empty());
    assert!(!config.unit_path().exists());
    assert_eq!(host.reloads.get(), 0);
    assert!(output.is_empty());
}

#[test]
fn failed_reload_surfaces_the_manager_diagnostic() {
    let (_tmp, config) = fixture();
    let host = FakeHost {
        reload_failure: Some("parking-scraper.service:3: Missing '='".into()),
        ..FakeHost::default()
    };

    let (result, output) = run(&host, &config);
    let err = result.unwrap_err();

    assert_eq!(err.step, Step::Registration);
    assert!(err.to_string().contains("Missing '='"));
    assert!(config.unit_path().exists());
    assert!(output.is_empty());
}

#[test]
fn unreadable_unit_file_fails_registration_without_reload() {
    let (_tmp, mut config) = fixture();
    config.unit_file = config.unit_file.with_file_name("absent.service");
    let host = FakeHost::default();

    let (result, output) = run(&host, &config);
    let err = result.unwrap_err();

    assert_eq!(err.step, Step::Registration);
    assert!(matches!(err.source, InstallerError::Copy { ref path, .. } if path.ends_with("absent.service")));
    assert!(!config.unit_path().exists());
    assert!(config.binary_path().exists());
    assert_eq!(host.reloads.get(), 0);
    assert!(output.is_empty());
}
