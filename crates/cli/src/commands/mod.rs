//! One-shot subcommands that work directly against the JSON store.

pub(crate) mod clock;
pub(crate) mod report;
pub(crate) mod sla;

use std::process;

use hrdesk_storage::JsonFileStorage;

use crate::config::Settings;
use crate::{report_error, OutputFormat};

/// A runtime for driving the async storage API from synchronous commands.
pub(crate) fn runtime(output: OutputFormat, quiet: bool) -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to start tokio runtime: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

/// Open the store named by `settings`, exiting on failure.
pub(crate) fn open_store(
    rt: &tokio::runtime::Runtime,
    settings: &Settings,
    output: OutputFormat,
    quiet: bool,
) -> JsonFileStorage {
    match rt.block_on(JsonFileStorage::open(&settings.data_dir)) {
        Ok(store) => store,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}

/// Hours for human output.
pub(crate) fn fmt_hours(hours: f64) -> String {
    format!("{:.1} h", hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_rounded_to_one_decimal() {
        assert_eq!(fmt_hours(36.0), "36.0 h");
        assert_eq!(fmt_hours(12.345), "12.3 h");
    }
}
