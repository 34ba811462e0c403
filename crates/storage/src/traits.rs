use async_trait::async_trait;
use hrdesk_core::{
    HrSnapshot, Milestone, Requisition, StopClockInterval, SurveyResponse, Ticket, TicketCategory,
    TicketStatus,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::StorageError;

/// Optional filters for [`HrStorage::list_tickets`]. `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TicketFilter {
    pub category: Option<TicketCategory>,
    pub status: Option<TicketStatus>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.category.is_none_or(|c| c == ticket.category)
            && self.status.is_none_or(|s| s == ticket.status)
    }
}

/// The storage trait for HR desk backends.
///
/// A backend owns the four entity collections (tickets, requisitions,
/// survey responses, stop-clock intervals) and keeps each in insertion
/// order. Records are never physically deleted.
///
/// ## Snapshot Semantics
///
/// [`snapshot`](HrStorage::snapshot) returns an owned copy of every
/// collection taken under a single read lock. Reports are computed over that
/// copy, so mutations that land while a report is being built never leak
/// into it.
///
/// ## Stop clock
///
/// `pause_clock` appends an open interval; `resume_clock` closes the most
/// recently appended open interval for the ticket, or does nothing when
/// there is none.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait HrStorage: Send + Sync + 'static {
    /// Consistent copy of all collections.
    async fn snapshot(&self) -> Result<HrSnapshot, StorageError>;

    // ── Tickets ──────────────────────────────────────────────────────────────

    /// Store a new ticket.
    ///
    /// Returns `Err(StorageError::DuplicateId)` if the id is taken.
    async fn insert_ticket(&self, ticket: Ticket) -> Result<(), StorageError>;

    /// Returns `Err(StorageError::TicketNotFound)` if the ticket does not exist.
    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, StorageError>;

    async fn list_tickets(&self, filter: TicketFilter) -> Result<Vec<Ticket>, StorageError>;

    /// Apply a status change (see [`Ticket::set_status`]) and return the
    /// updated ticket.
    async fn update_ticket_status(
        &self,
        ticket_id: &str,
        status: TicketStatus,
        now: OffsetDateTime,
    ) -> Result<Ticket, StorageError>;

    // ── Requisitions ─────────────────────────────────────────────────────────

    /// Store a new requisition. The owning ticket is not checked.
    async fn insert_requisition(&self, requisition: Requisition) -> Result<(), StorageError>;

    /// Returns `Err(StorageError::RequisitionNotFound)` if it does not exist.
    async fn get_requisition(&self, requisition_id: &str) -> Result<Requisition, StorageError>;

    async fn list_requisitions(&self) -> Result<Vec<Requisition>, StorageError>;

    /// Set one milestone timestamp and return the updated requisition.
    async fn record_milestone(
        &self,
        requisition_id: &str,
        milestone: Milestone,
        at: OffsetDateTime,
    ) -> Result<Requisition, StorageError>;

    // ── Surveys ──────────────────────────────────────────────────────────────

    async fn insert_survey_response(&self, response: SurveyResponse) -> Result<(), StorageError>;

    async fn list_survey_responses(&self) -> Result<Vec<SurveyResponse>, StorageError>;

    // ── Stop clock ───────────────────────────────────────────────────────────

    /// Open a new stop interval on `ticket_id` starting at `now`.
    ///
    /// Returns `Err(StorageError::TicketNotFound)` if the ticket does not exist.
    async fn pause_clock(
        &self,
        ticket_id: &str,
        reason: &str,
        now: OffsetDateTime,
    ) -> Result<StopClockInterval, StorageError>;

    /// Close the latest-appended open interval on `ticket_id` at `now`.
    ///
    /// `Ok(None)` when nothing is open. Returns
    /// `Err(StorageError::TicketNotFound)` if the ticket does not exist.
    async fn resume_clock(
        &self,
        ticket_id: &str,
        now: OffsetDateTime,
    ) -> Result<Option<StopClockInterval>, StorageError>;

    /// Stop intervals, optionally restricted to one ticket.
    async fn list_stop_intervals(
        &self,
        ticket_id: Option<&str>,
    ) -> Result<Vec<StopClockInterval>, StorageError>;
}
