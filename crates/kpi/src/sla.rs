//! Per-ticket SLA view over the stop-clock model.

use hrdesk_core::{HrSnapshot, Ticket, TicketCategory};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ledger::StopClockLedger;
use crate::report::FAIRNESS_CLOSE_HOURS;

/// Where a single ticket stands against its SLA clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaStatus {
    pub ticket_id: String,
    /// Hours elapsed since creation (until closure, or `now` if still open)
    /// with stop-clock time removed.
    pub effective_hours: f64,
    /// The ticket has at least one open stop interval.
    pub paused: bool,
    /// Effective-hours budget for the category, if it has one.
    pub target_hours: Option<f64>,
    pub breached: bool,
}

/// SLA budget for a ticket category. Only Fairness cases carry one.
pub fn target_hours(category: TicketCategory) -> Option<f64> {
    match category {
        TicketCategory::Fairness => Some(FAIRNESS_CLOSE_HOURS),
        _ => None,
    }
}

pub fn sla_status(ticket: &Ticket, ledger: &StopClockLedger, now: OffsetDateTime) -> SlaStatus {
    let window_end = ticket.closed_at.unwrap_or(now);
    let effective_hours = ledger.effective_hours(&ticket.id, ticket.created_at, window_end, now);
    let target_hours = target_hours(ticket.category);
    SlaStatus {
        ticket_id: ticket.id.clone(),
        effective_hours,
        paused: ledger.is_paused(&ticket.id),
        target_hours,
        breached: target_hours.is_some_and(|target| effective_hours > target),
    }
}

/// SLA view for `ticket_id` read from a single snapshot, so the ticket and
/// its stops come from the same point in time. `None` when no such ticket.
pub fn snapshot_sla_status(
    snapshot: &HrSnapshot,
    ticket_id: &str,
    now: OffsetDateTime,
) -> Option<SlaStatus> {
    let ticket = snapshot.ticket(ticket_id)?;
    let ledger = StopClockLedger::from_intervals(snapshot.stop_clock_intervals.clone());
    Some(sla_status(ticket, &ledger, now))
}
