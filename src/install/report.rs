//! Completion and failure messages for the operator.

use termcolor::{Color, ColorSpec, WriteColor};

use super::{AccountOutcome, ConfigOutcome, ProvisionSummary, StepError};
use crate::config::ProvisionConfig;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print the completion summary and the commands the operator runs next.
pub fn show_completion<W: WriteColor>(
    out: &mut W,
    config: &ProvisionConfig,
    summary: &ProvisionSummary,
) {
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(out, "\n{RULE}");
    let _ = out.reset();

    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(out, "\n✓ {} installed successfully\n", config.service_name);
    let _ = out.reset();

    let account = match summary.account {
        AccountOutcome::Created => "created",
        AccountOutcome::Existing => "already present",
    };
    let _ = writeln!(out, "  Service account: {} ({account})", config.service_name);
    let _ = writeln!(out, "  Binary:          {}", config.binary_path().display());
    let _ = writeln!(out, "  Unit file:       {}", config.unit_path().display());

    match &summary.config {
        ConfigOutcome::Seeded(path) => {
            let _ = writeln!(out, "  Configuration:   {} (default)", path.display());
        }
        ConfigOutcome::Skipped { entries } => {
            let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
            let _ = writeln!(
                out,
                "  Configuration:   kept existing {} ({} entries, nothing written)",
                config.config_dir().display(),
                entries.len()
            );
            let _ = out.reset();
        }
    }

    let _ = writeln!(out, "\nNext steps:");
    match &summary.config {
        ConfigOutcome::Seeded(path) => {
            let _ = writeln!(out, "  1. Review the configuration: {}", path.display());
        }
        // the kept files need not include the default file name
        ConfigOutcome::Skipped { .. } => {
            let _ = writeln!(
                out,
                "  1. Review the existing configuration in {}",
                config.config_dir().display()
            );
        }
    }
    let _ = write!(out, "  2. Enable and start the service: ");
    let _ = out.set_color(ColorSpec::new().set_bold(true));
    let _ = writeln!(out, "sudo {}", config.enable_command());
    let _ = out.reset();

    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(out, "\n{RULE}\n");
    let _ = out.reset();
}

/// Print the fatal error banner for a failed step.
pub fn show_failure<W: WriteColor>(out: &mut W, err: &StepError) {
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = writeln!(out, "\n❌ FATAL: {} failed", err.step);
    let _ = out.reset();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
    let _ = writeln!(out, "   Error: {}", err.source);
    let _ = out.reset();
    if err.is_permission_denied() {
        let _ = writeln!(out, "   Nothing was changed on this host.");
    } else {
        let _ = writeln!(
            out,
            "   Earlier steps were kept; re-run after fixing the cause."
        );
    }
}
