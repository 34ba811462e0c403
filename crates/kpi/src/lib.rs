//! HR desk KPI engine.
//!
//! Consumes read-only snapshots of tickets, requisitions, survey responses
//! and stop-clock intervals and reduces them to a fixed set of HR KPIs.
//! Everything in this crate is synchronous and free of I/O. The only
//! real-time input is `now`, which callers pass explicitly: open-ended stop
//! intervals are treated as running until that instant.
//!
//! Missing data never surfaces as zero. Every metric in [`KpiReport`] is an
//! `Option`, and `None` means "undefined, insufficient data".

pub mod interval;
pub mod ledger;
pub mod report;
pub mod sla;
pub mod stats;

pub use interval::{effective_hours, hours_between, overlap_duration};
pub use ledger::StopClockLedger;
pub use report::{compute_report, compute_snapshot_report, KpiReport, FAIRNESS_CLOSE_HOURS};
pub use sla::{sla_status, snapshot_sla_status, SlaStatus};
pub use stats::{average, percentage};
