use std::process;

use hrdesk_kpi::{compute_snapshot_report, KpiReport};
use hrdesk_storage::HrStorage;
use time::OffsetDateTime;

use super::{fmt_hours, open_store, runtime};
use crate::config::Settings;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_report(
    settings: &Settings,
    at: Option<OffsetDateTime>,
    output: OutputFormat,
    quiet: bool,
) {
    let rt = runtime(output, quiet);
    let store = open_store(&rt, settings, output, quiet);
    let snapshot = match rt.block_on(store.snapshot()) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    let now = at.unwrap_or_else(OffsetDateTime::now_utc);
    let report = compute_snapshot_report(&snapshot, now);

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                report_error(&format!("could not serialize report: {}", e), output, quiet);
                process::exit(1);
            }
        },
        OutputFormat::Text => print!("{}", render_text(&report)),
    }
}

/// Human-readable report. Undefined metrics print as `n/a`, never `0`.
pub(crate) fn render_text(report: &KpiReport) -> String {
    let na = || "n/a".to_string();
    let rows = [
        ("Time to offer (ttp)", report.ttp.map(fmt_hours).unwrap_or_else(na)),
        ("Time to fill (ttf)", report.ttf.map(fmt_hours).unwrap_or_else(na)),
        (
            "Fairness closed within 72h",
            report
                .close72_rate
                .map(|r| format!("{}%", r))
                .unwrap_or_else(na),
        ),
        (
            "Candidate pool multiple",
            report
                .pool_multiple
                .map(|m| format!("{}x", m))
                .unwrap_or_else(na),
        ),
        ("eNPS", report.enps.map(|e| e.to_string()).unwrap_or_else(na)),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        out.push_str(&format!("{:<28}{}\n", format!("{}:", label), value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_report_text() {
        let report = KpiReport {
            ttp: Some(36.0),
            ttf: Some(180.0),
            close72_rate: Some(50),
            pool_multiple: Some(3),
            enps: Some(14),
        };
        let text = render_text(&report);
        assert!(text.contains("Time to offer (ttp):"));
        assert!(text.contains("36.0 h"));
        assert!(text.contains("180.0 h"));
        assert!(text.contains("50%"));
        assert!(text.contains("3x"));
        assert!(text.lines().last().unwrap().ends_with("14"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn undefined_metrics_show_na_not_zero() {
        let text = render_text(&KpiReport::default());
        assert_eq!(text.matches("n/a").count(), 5);
        assert!(!text.contains('0'));
    }

    #[test]
    fn zero_is_distinct_from_undefined() {
        let report = KpiReport {
            close72_rate: Some(0),
            enps: Some(0),
            ..KpiReport::default()
        };
        let text = render_text(&report);
        assert!(text.contains("0%"));
        assert_eq!(text.matches("n/a").count(), 3);
    }
}
