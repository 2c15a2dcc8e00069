//! Human-readable summaries printed after each command.

use std::path::Path;

use bootmount_common::constants::APP_NAME;
use bootmount_core::filesystem::{MountOutcome, MoveOutcome};
use bootmount_core::handoff::Launch;
use bootmount_core::plan::BootReport;

/// Prints one line of command output, prefixed with the binary name.
#[allow(clippy::print_stdout)]
pub fn print_line(line: &str) {
    println!("{APP_NAME}: {line}");
}

/// Describes what a mount request did.
#[must_use]
pub fn format_mount(target: &Path, outcome: MountOutcome) -> String {
    match outcome {
        MountOutcome::Mounted => format!("mounted {}", target.display()),
        MountOutcome::SkippedInContainer => {
            format!("{}: skipped (container)", target.display())
        }
    }
}

/// Describes a finished subtree move.
#[must_use]
pub fn format_move(source: &Path, target: &Path, outcome: MoveOutcome) -> String {
    let cleanup = match outcome {
        MoveOutcome::SourceRemoved => "source removed".to_owned(),
        MoveOutcome::SourceKept { entries } => format!("source kept, {entries} entries left"),
    };
    format!("moved {} to {} ({cleanup})", source.display(), target.display())
}

/// Describes the launch of one home's init.
#[must_use]
pub fn format_launch(home: &Path, launch: &Launch) -> String {
    match launch {
        Launch::Detached { pid } => format!("{}: init started (pid {pid})", home.display()),
        Launch::SpawnFailed(err) => format!("{}: init failed to start: {err}", home.display()),
    }
}

/// Summarises a boot plan run, one line per home plus a total.
#[must_use]
pub fn format_report(report: &BootReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .launches
        .iter()
        .map(|(home, launch)| format_launch(home, launch))
        .collect();
    lines.extend(
        report
            .rejected
            .iter()
            .map(|(home, err)| format!("{}: rejected: {err}", home.display())),
    );
    let started = report.launches.iter().filter(|(_, l)| l.pid().is_some()).count();
    lines.push(format!(
        "{started} init(s) started, {} rejected, {} device(s) consumed",
        report.rejected.len(),
        report.devices.consumed().len()
    ));
    lines
}
