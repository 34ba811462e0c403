//! Collection mutations shared by every backend.
//!
//! Backends hold an [`HrSnapshot`] behind a lock and call these helpers
//! with the write guard held. The JSON backend applies them to a copy and
//! keeps the copy only after the touched collection file was rewritten.

use hrdesk_core::{
    id, HrSnapshot, Milestone, Requisition, StopClockInterval, SurveyResponse, Ticket,
    TicketStatus,
};
use hrdesk_kpi::StopClockLedger;
use time::OffsetDateTime;
use tracing::warn;

use crate::error::StorageError;
use crate::traits::TicketFilter;

/// One persisted entity collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tickets,
    Requisitions,
    SurveyResponses,
    StopClock,
}

impl Collection {
    /// File name used by the JSON backend.
    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Tickets => "tickets.json",
            Collection::Requisitions => "requisitions.json",
            Collection::SurveyResponses => "surveys.json",
            Collection::StopClock => "stop_clock.json",
        }
    }
}

pub(crate) fn insert_ticket(state: &mut HrSnapshot, ticket: Ticket) -> Result<(), StorageError> {
    if state.ticket(&ticket.id).is_some() {
        return Err(StorageError::DuplicateId {
            kind: "ticket",
            id: ticket.id,
        });
    }
    ticket.check_closure()?;
    state.tickets.push(ticket);
    Ok(())
}

pub(crate) fn get_ticket(state: &HrSnapshot, ticket_id: &str) -> Result<Ticket, StorageError> {
    state
        .ticket(ticket_id)
        .cloned()
        .ok_or_else(|| StorageError::ticket_not_found(ticket_id))
}

pub(crate) fn list_tickets(state: &HrSnapshot, filter: TicketFilter) -> Vec<Ticket> {
    state
        .tickets
        .iter()
        .filter(|t| filter.matches(t))
        .cloned()
        .collect()
}

pub(crate) fn update_ticket_status(
    state: &mut HrSnapshot,
    ticket_id: &str,
    status: TicketStatus,
    now: OffsetDateTime,
) -> Result<Ticket, StorageError> {
    let ticket = state
        .tickets
        .iter_mut()
        .find(|t| t.id == ticket_id)
        .ok_or_else(|| StorageError::ticket_not_found(ticket_id))?;
    ticket.set_status(status, now)?;
    Ok(ticket.clone())
}

pub(crate) fn insert_requisition(
    state: &mut HrSnapshot,
    requisition: Requisition,
) -> Result<(), StorageError> {
    if state.requisition(&requisition.id).is_some() {
        return Err(StorageError::DuplicateId {
            kind: "requisition",
            id: requisition.id,
        });
    }
    state.requisitions.push(requisition);
    Ok(())
}

pub(crate) fn get_requisition(
    state: &HrSnapshot,
    requisition_id: &str,
) -> Result<Requisition, StorageError> {
    state
        .requisition(requisition_id)
        .cloned()
        .ok_or_else(|| StorageError::requisition_not_found(requisition_id))
}

pub(crate) fn record_milestone(
    state: &mut HrSnapshot,
    requisition_id: &str,
    milestone: Milestone,
    at: OffsetDateTime,
) -> Result<Requisition, StorageError> {
    let requisition = state
        .requisitions
        .iter_mut()
        .find(|r| r.id == requisition_id)
        .ok_or_else(|| StorageError::requisition_not_found(requisition_id))?;
    requisition.record_milestone(milestone, at);
    if let Some(out_of_order) = requisition.out_of_order_milestone() {
        warn!(
            requisition_id,
            milestone = %out_of_order,
            "requisition milestone precedes an earlier milestone"
        );
    }
    Ok(requisition.clone())
}

pub(crate) fn pause_clock(
    state: &mut HrSnapshot,
    ticket_id: &str,
    reason: &str,
    now: OffsetDateTime,
) -> Result<StopClockInterval, StorageError> {
    if state.ticket(ticket_id).is_none() {
        return Err(StorageError::ticket_not_found(ticket_id));
    }
    let mut ledger = StopClockLedger::from(std::mem::take(&mut state.stop_clock_intervals));
    let stop = ledger
        .pause(id::generate(id::STOP_PREFIX), ticket_id, reason, now)
        .clone();
    state.stop_clock_intervals = ledger.into_intervals();
    Ok(stop)
}

pub(crate) fn resume_clock(
    state: &mut HrSnapshot,
    ticket_id: &str,
    now: OffsetDateTime,
) -> Result<Option<StopClockInterval>, StorageError> {
    if state.ticket(ticket_id).is_none() {
        return Err(StorageError::ticket_not_found(ticket_id));
    }
    let mut ledger = StopClockLedger::from(std::mem::take(&mut state.stop_clock_intervals));
    let closed = ledger.resume(ticket_id, now).cloned();
    state.stop_clock_intervals = ledger.into_intervals();
    Ok(closed)
}

pub(crate) fn list_stop_intervals(
    state: &HrSnapshot,
    ticket_id: Option<&str>,
) -> Vec<StopClockInterval> {
    match ticket_id {
        Some(ticket_id) => state.stops_for(ticket_id).cloned().collect(),
        None => state.stop_clock_intervals.clone(),
    }
}

pub(crate) fn insert_survey_response(state: &mut HrSnapshot, response: SurveyResponse) {
    state.survey_responses.push(response);
}
