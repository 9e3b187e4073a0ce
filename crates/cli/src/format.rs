//! Report and error formatting for human and JSON output modes.

use wikivault_durability::{BackupError, BackupReport};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a finished run.
pub fn format_report(report: &BackupReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
        OutputMode::Human => report.to_string(),
    }
}

/// Format a failed run.
pub fn format_error(err: &BackupError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": err.to_string(),
            "kind": error_kind(err),
        }))
        .unwrap_or_else(|_| format!("{}", err)),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn error_kind(err: &BackupError) -> &'static str {
    match err {
        BackupError::Config(_) => "config",
        BackupError::Walk { .. } => "walk",
        BackupError::Decode { .. } => "decode",
        BackupError::Filter { .. } => "filter",
        BackupError::Write { .. } => "write",
        BackupError::Publish { .. } => "publish",
        BackupError::Cancelled => "cancelled",
    }
}
