use std::process;

use hrdesk_storage::HrStorage;
use time::OffsetDateTime;

use super::{open_store, runtime};
use crate::config::Settings;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_pause(
    settings: &Settings,
    ticket_id: &str,
    reason: &str,
    output: OutputFormat,
    quiet: bool,
) {
    let rt = runtime(output, quiet);
    let store = open_store(&rt, settings, output, quiet);
    let now = OffsetDateTime::now_utc();

    let stop = match rt.block_on(store.pause_clock(ticket_id, reason, now)) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&serde_json::to_value(&stop), output, quiet),
        OutputFormat::Text => {
            if !quiet {
                println!("Paused {} ({})", ticket_id, stop.id);
            }
        }
    }
}

/// Resuming a ticket with no running pause is not an error.
pub(crate) fn cmd_resume(settings: &Settings, ticket_id: &str, output: OutputFormat, quiet: bool) {
    let rt = runtime(output, quiet);
    let store = open_store(&rt, settings, output, quiet);
    let now = OffsetDateTime::now_utc();

    let closed = match rt.block_on(store.resume_clock(ticket_id, now)) {
        Ok(c) => c,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match (output, closed) {
        (OutputFormat::Json, Some(stop)) => {
            print_json(&serde_json::to_value(&stop), output, quiet)
        }
        (OutputFormat::Json, None) => {
            println!("{}", serde_json::json!({ "resumed": null }))
        }
        (OutputFormat::Text, Some(stop)) => {
            if !quiet {
                println!("Resumed {} ({})", ticket_id, stop.id);
            }
        }
        (OutputFormat::Text, None) => {
            if !quiet {
                println!("{} has no running pause", ticket_id);
            }
        }
    }
}

fn print_json(value: &serde_json::Result<serde_json::Value>, output: OutputFormat, quiet: bool) {
    match value {
        Ok(v) => println!("{}", v),
        Err(e) => {
            report_error(&format!("could not serialize interval: {}", e), output, quiet);
            process::exit(1);
        }
    }
}
