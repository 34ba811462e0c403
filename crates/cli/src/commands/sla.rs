use std::process;

use hrdesk_kpi::{snapshot_sla_status, SlaStatus};
use hrdesk_storage::{HrStorage, StorageError};
use time::OffsetDateTime;

use super::{fmt_hours, open_store, runtime};
use crate::config::Settings;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_sla(
    settings: &Settings,
    ticket_id: &str,
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
    let status = match snapshot_sla_status(&snapshot, ticket_id, now) {
        Some(s) => s,
        None => {
            let err = StorageError::TicketNotFound {
                ticket_id: ticket_id.to_string(),
            };
            report_error(&err.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&status) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                report_error(&format!("could not serialize SLA status: {}", e), output, quiet);
                process::exit(1);
            }
        },
        OutputFormat::Text => print!("{}", render_text(&status)),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub(crate) fn render_text(status: &SlaStatus) -> String {
    let target = status
        .target_hours
        .map(fmt_hours)
        .unwrap_or_else(|| "none".to_string());
    format!(
        "Ticket {}\n  effective: {}\n  target:    {}\n  paused:    {}\n  breached:  {}\n",
        status.ticket_id,
        fmt_hours(status.effective_hours),
        target,
        yes_no(status.paused),
        yes_no(status.breached),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breached_fairness_ticket() {
        let text = render_text(&SlaStatus {
            ticket_id: "tkt_f2".to_string(),
            effective_hours: 100.0,
            paused: false,
            target_hours: Some(72.0),
            breached: true,
        });
        assert!(text.starts_with("Ticket tkt_f2\n"));
        assert!(text.contains("effective: 100.0 h"));
        assert!(text.contains("target:    72.0 h"));
        assert!(text.contains("breached:  yes"));
    }

    #[test]
    fn category_without_target() {
        let text = render_text(&SlaStatus {
            ticket_id: "tkt_h1".to_string(),
            effective_hours: 5.5,
            paused: true,
            target_hours: None,
            breached: false,
        });
        assert!(text.contains("target:    none"));
        assert!(text.contains("paused:    yes"));
    }
}
