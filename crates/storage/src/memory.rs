use async_trait::async_trait;
use hrdesk_core::{
    HrSnapshot, Milestone, Requisition, StopClockInterval, SurveyResponse, Ticket, TicketStatus,
};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::state;
use crate::traits::{HrStorage, TicketFilter};

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<HrSnapshot>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing collections.
    pub fn with_snapshot(snapshot: HrSnapshot) -> Self {
        MemoryStorage {
            state: RwLock::new(snapshot),
        }
    }
}

#[async_trait]
impl HrStorage for MemoryStorage {
    async fn snapshot(&self) -> Result<HrSnapshot, StorageError> {
        Ok(self.state.read().await.clone())
    }

    async fn insert_ticket(&self, ticket: Ticket) -> Result<(), StorageError> {
        state::insert_ticket(&mut *self.state.write().await, ticket)
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, StorageError> {
        state::get_ticket(&*self.state.read().await, ticket_id)
    }

    async fn list_tickets(&self, filter: TicketFilter) -> Result<Vec<Ticket>, StorageError> {
        Ok(state::list_tickets(&*self.state.read().await, filter))
    }

    async fn update_ticket_status(
        &self,
        ticket_id: &str,
        status: TicketStatus,
        now: OffsetDateTime,
    ) -> Result<Ticket, StorageError> {
        state::update_ticket_status(&mut *self.state.write().await, ticket_id, status, now)
    }

    async fn insert_requisition(&self, requisition: Requisition) -> Result<(), StorageError> {
        state::insert_requisition(&mut *self.state.write().await, requisition)
    }

    async fn get_requisition(&self, requisition_id: &str) -> Result<Requisition, StorageError> {
        state::get_requisition(&*self.state.read().await, requisition_id)
    }

    async fn list_requisitions(&self) -> Result<Vec<Requisition>, StorageError> {
        Ok(self.state.read().await.requisitions.clone())
    }

    async fn record_milestone(
        &self,
        requisition_id: &str,
        milestone: Milestone,
        at: OffsetDateTime,
    ) -> Result<Requisition, StorageError> {
        state::record_milestone(&mut *self.state.write().await, requisition_id, milestone, at)
    }

    async fn insert_survey_response(&self, response: SurveyResponse) -> Result<(), StorageError> {
        state::insert_survey_response(&mut *self.state.write().await, response);
        Ok(())
    }

    async fn list_survey_responses(&self) -> Result<Vec<SurveyResponse>, StorageError> {
        Ok(self.state.read().await.survey_responses.clone())
    }

    async fn pause_clock(
        &self,
        ticket_id: &str,
        reason: &str,
        now: OffsetDateTime,
    ) -> Result<StopClockInterval, StorageError> {
        state::pause_clock(&mut *self.state.write().await, ticket_id, reason, now)
    }

    async fn resume_clock(
        &self,
        ticket_id: &str,
        now: OffsetDateTime,
    ) -> Result<Option<StopClockInterval>, StorageError> {
        state::resume_clock(&mut *self.state.write().await, ticket_id, now)
    }

    async fn list_stop_intervals(
        &self,
        ticket_id: Option<&str>,
    ) -> Result<Vec<StopClockInterval>, StorageError> {
        Ok(state::list_stop_intervals(&*self.state.read().await, ticket_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrdesk_core::TicketCategory;
    use time::macros::datetime;

    #[tokio::test]
    async fn with_snapshot_exposes_seeded_records() {
        let mut seed = HrSnapshot::default();
        seed.tickets.push(
            Ticket::open(
                "tkt_seed".to_string(),
                TicketCategory::Onboarding,
                "Laptop for new hire",
                datetime!(2025-01-01 00:00 UTC),
            )
            .unwrap(),
        );
        let storage = MemoryStorage::with_snapshot(seed.clone());
        assert_eq!(storage.snapshot().await.unwrap(), seed);
        assert_eq!(
            storage.get_ticket("tkt_seed").await.unwrap().title,
            "Laptop for new hire"
        );
    }

    #[tokio::test]
    async fn snapshot_is_a_copy() {
        let storage = MemoryStorage::new();
        let before = storage.snapshot().await.unwrap();
        storage
            .insert_survey_response(SurveyResponse::new(9, None).unwrap())
            .await
            .unwrap();
        assert!(before.survey_responses.is_empty());
        assert_eq!(storage.snapshot().await.unwrap().survey_responses.len(), 1);
    }
}
