// Output formatting for the status and parse commands

use crate::models::{Module, ModuleStatus, RunIdentity};
use crate::repo::LedgerEntries;
use crate::trigger::RunSummary;
use chrono::NaiveDateTime;
use std::io::IsTerminal;

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Format timestamp for display
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format duration for display
pub fn format_duration(secs: i64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Run identity as `key: value` lines
pub fn format_identity(id: &RunIdentity) -> String {
    format!(
        "Session: {}\nGate:    {}\nTrigger: {}\nProbe:   {}\n",
        id.session, id.gate, id.trigger, id.probe
    )
}

fn status_label(status: &ModuleStatus) -> &'static str {
    if status.is_complete() {
        "done"
    } else if status.start_time.is_some() {
        "started"
    } else {
        "pending"
    }
}

/// Ledger as a table, one row per listed module
pub fn format_status_table(entries: &LedgerEntries, modules: &[Module], tty: bool) -> String {
    let header = format!(
        "{:<26} {:<8} {:<20} {:<20} {:>10}",
        "Module", "Status", "Started", "Completed", "Duration"
    );
    let mut output = String::new();
    output.push_str(&bold_if_tty(&header, tty));
    output.push('\n');

    let unset = ModuleStatus::default();
    for module in modules {
        let status = entries.get(module.as_str()).unwrap_or(&unset);
        let started = status.start_time.as_ref().map(format_timestamp).unwrap_or_else(|| "-".to_string());
        let completed = status
            .completion_time
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        let duration = status
            .duration
            .map(|d| format_duration(d.round() as i64))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:<26} {:<8} {:<20} {:<20} {:>10}\n",
            module.as_str(),
            status_label(status),
            started,
            completed,
            duration
        ));
    }
    output
}

/// One-paragraph report of a `run` invocation
pub fn format_run_summary(summary: &RunSummary) -> String {
    let names = |modules: &[Module]| {
        if modules.is_empty() {
            "(none)".to_string()
        } else {
            modules.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
        }
    };
    let mut output = String::new();
    if summary.catgt_ran {
        output.push_str("CatGT: ran\n");
    }
    output.push_str(&format!("Executed: {}\n", names(&summary.executed)));
    output.push_str(&format!("Skipped:  {}\n", names(&summary.skipped)));
    output.push_str(&format!("Ledger:   {}\n", summary.ledger_path.display()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::StatusLedger;
    use chrono::NaiveDate;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5), "5s");
        assert_eq!(format_duration(125), "2m5s");
        assert_eq!(format_duration(3725), "1h2m5s");
    }

    #[test]
    fn test_status_table_rows() {
        let mut entries = StatusLedger::unset_entries();
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        entries.insert(
            "kilosort_helper".into(),
            ModuleStatus::finished(day.and_hms_opt(8, 0, 0).unwrap(), day.and_hms_opt(8, 20, 5).unwrap()),
        );

        let table = format_status_table(&entries, &Module::ALL, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Module"));
        assert!(lines[1].starts_with("kilosort_helper"));
        assert!(lines[1].contains("done"));
        assert!(lines[1].contains("2024-01-02 08:20:05"));
        assert!(lines[1].ends_with("20m5s"));
        assert!(lines[5].starts_with("quality_metrics"));
        assert!(lines[5].contains("pending"));

        let single = format_status_table(&entries, &[Module::NoiseTemplates], false);
        assert_eq!(single.lines().count(), 2);
    }

    #[test]
    fn test_format_identity() {
        let id = RunIdentity {
            session: "run1".into(),
            gate: "0".into(),
            trigger: "0".into(),
            probe: "1".into(),
        };
        assert!(format_identity(&id).contains("Probe:   1"));
    }
}
