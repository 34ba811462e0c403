mod commands;
mod config;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use crate::config::{FlagOverrides, Settings};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// HR desk service and reporting tool.
#[derive(Parser)]
#[command(name = "hrdesk", version, about = "HR desk tickets, stop clock, and KPI reporting")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the data lives. Shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct StoreArgs {
    /// Directory holding the JSON collection files
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HR desk HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print the KPI report
    Report {
        #[command(flatten)]
        store: StoreArgs,
        /// Evaluate as of this RFC 3339 instant instead of now
        #[arg(long, value_parser = parse_instant)]
        at: Option<OffsetDateTime>,
    },

    /// Show effective hours and SLA status for one ticket
    Sla {
        /// Ticket id
        ticket_id: String,
        #[command(flatten)]
        store: StoreArgs,
        /// Evaluate as of this RFC 3339 instant instead of now
        #[arg(long, value_parser = parse_instant)]
        at: Option<OffsetDateTime>,
    },

    /// Pause the SLA clock on a ticket
    Pause {
        /// Ticket id
        ticket_id: String,
        /// Why the clock is stopped
        #[arg(long, default_value = "")]
        reason: String,
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Resume the SLA clock on a ticket
    Resume {
        /// Ticket id
        ticket_id: String,
        #[command(flatten)]
        store: StoreArgs,
    },
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|e| format!("expected an RFC 3339 timestamp like 2025-01-31T09:00:00Z ({e})"))
}

fn main() {
    let cli = Cli::parse();
    let serving = matches!(cli.command, Commands::Serve { .. });
    init_tracing(if serving { "info" } else { "warn" });

    match cli.command {
        Commands::Serve { port, store } => {
            let settings = load_settings(&store, port, cli.output, cli.quiet);
            let rt = commands::runtime(cli.output, cli.quiet);
            if let Err(e) = rt.block_on(serve::start_server(settings)) {
                report_error(&format!("server error: {}", e), cli.output, cli.quiet);
                process::exit(1);
            }
        }
        Commands::Report { store, at } => {
            let settings = load_settings(&store, None, cli.output, cli.quiet);
            commands::report::cmd_report(&settings, at, cli.output, cli.quiet);
        }
        Commands::Sla {
            ticket_id,
            store,
            at,
        } => {
            let settings = load_settings(&store, None, cli.output, cli.quiet);
            commands::sla::cmd_sla(&settings, &ticket_id, at, cli.output, cli.quiet);
        }
        Commands::Pause {
            ticket_id,
            reason,
            store,
        } => {
            let settings = load_settings(&store, None, cli.output, cli.quiet);
            commands::clock::cmd_pause(&settings, &ticket_id, &reason, cli.output, cli.quiet);
        }
        Commands::Resume { ticket_id, store } => {
            let settings = load_settings(&store, None, cli.output, cli.quiet);
            commands::clock::cmd_resume(&settings, &ticket_id, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins
/// over `default_level`.
fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(
    store: &StoreArgs,
    port: Option<u16>,
    output: OutputFormat,
    quiet: bool,
) -> Settings {
    let flags = FlagOverrides {
        config: store.config.clone(),
        port,
        data_dir: store.data_dir.clone(),
    };
    match Settings::load(flags) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
