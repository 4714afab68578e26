//! Installer error taxonomy.
//!
//! Every provisioning step fails with an [`InstallerError`]; the orchestrator
//! wraps it in a [`StepError`] naming the step, which is what the binary
//! prints and turns into an exit code.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Exit code for a run without administrative privilege (`EX_NOPERM`).
pub const EXIT_PERMISSION_DENIED: i32 = 77;
/// Exit code when an account or directory could not be created (`EX_CANTCREAT`).
pub const EXIT_RESOURCE_CREATION: i32 = 73;
/// Exit code for a failed file installation (`EX_IOERR`).
pub const EXIT_COPY: i32 = 74;
/// Exit code when the service manager could not be reloaded (`EX_UNAVAILABLE`).
pub const EXIT_REGISTRATION: i32 = 69;
/// Exit code for an unreadable or invalid provisioning manifest (`EX_CONFIG`).
pub const EXIT_CONFIG: i32 = 78;

#[derive(Debug, Error)]
pub enum InstallerError {
    /// The invoking principal is not privileged.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Account, directory or ownership could not be established.
    #[error("failed to create {resource}: {reason}")]
    ResourceCreation { resource: String, reason: String },

    /// A file could not be read, listed or written into place.
    #[error("file installation failed at {}: {reason}", .path.display())]
    Copy { path: PathBuf, reason: String },

    /// The service manager reload could not be run or reported failure.
    #[error("service registration failed: {0}")]
    Registration(String),
}

impl InstallerError {
    pub(crate) fn resource(resource: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::ResourceCreation {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn copy(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::Copy {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PermissionDenied(_) => EXIT_PERMISSION_DENIED,
            Self::ResourceCreation { .. } => EXIT_RESOURCE_CREATION,
            Self::Copy { .. } => EXIT_COPY,
            Self::Registration(_) => EXIT_REGISTRATION,
        }
    }
}

/// Provisioning steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Privileges,
    Account,
    Layout,
    Artifact,
    Config,
    Registration,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Privileges => "privilege check",
            Self::Account => "service account",
            Self::Layout => "directory layout",
            Self::Artifact => "binary installation",
            Self::Config => "configuration seeding",
            Self::Registration => "service registration",
        };
        f.write_str(name)
    }
}

/// A failure together with the step that produced it.
#[derive(Debug, Error)]
#[error("{step} failed: {source}")]
pub struct StepError {
    pub step: Step,
    #[source]
    pub source: InstallerError,
}

impl StepError {
    pub fn exit_code(&self) -> i32 {
        self.source.exit_code()
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self.source, InstallerError::PermissionDenied(_))
    }
}

/// Adapter for `map_err` that tags an error with its step.
pub(crate) fn at(step: Step) -> impl FnOnce(InstallerError) -> StepError {
    move |source| StepError { step, source }
}
