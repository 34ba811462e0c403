//! JSON-file backend.
//!
//! Each collection lives in its own file under the data directory as a
//! JSON array in insertion order. The whole dataset is loaded at open and
//! kept in memory. A mutation runs against a copy of the state, the touched
//! collection file is rewritten from that copy via a temp file and rename,
//! and only then does the copy replace the in-memory state. A failed write
//! leaves both the file and memory as they were.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hrdesk_core::{
    HrSnapshot, Milestone, Requisition, StopClockInterval, SurveyResponse, Ticket, TicketStatus,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::state::{self, Collection};
use crate::traits::{HrStorage, TicketFilter};

#[derive(Debug)]
pub struct JsonFileStorage {
    dir: PathBuf,
    state: RwLock<HrSnapshot>,
}

impl JsonFileStorage {
    /// Open (creating if needed) the data directory and load every collection.
    ///
    /// Missing collection files are treated as empty. Records are checked
    /// against the model invariants on load: out-of-range survey scores
    /// surface as [`StorageError::Serialization`], tickets closed before
    /// they were created as [`StorageError::InvalidRecord`].
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::Io {
                path: dir.clone(),
                source,
            })?;

        let tickets: Vec<Ticket> = load_collection(&dir, Collection::Tickets).await?;
        for ticket in &tickets {
            ticket.check_closure()?;
        }

        let snapshot = HrSnapshot {
            tickets,
            requisitions: load_collection(&dir, Collection::Requisitions).await?,
            survey_responses: load_collection(&dir, Collection::SurveyResponses).await?,
            stop_clock_intervals: load_collection(&dir, Collection::StopClock).await?,
        };

        info!(
            dir = %dir.display(),
            tickets = snapshot.tickets.len(),
            requisitions = snapshot.requisitions.len(),
            survey_responses = snapshot.survey_responses.len(),
            stop_intervals = snapshot.stop_clock_intervals.len(),
            "opened json storage"
        );

        Ok(JsonFileStorage {
            dir,
            state: RwLock::new(snapshot),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Apply `mutate` to a copy of the state, write `collection` from the
    /// copy when `changed` says so, and swap the copy in once the write
    /// succeeded. The write lock is held throughout.
    async fn commit<R>(
        &self,
        collection: Collection,
        mutate: impl FnOnce(&mut HrSnapshot) -> Result<R, StorageError>,
        changed: impl FnOnce(&R) -> bool,
    ) -> Result<R, StorageError> {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();
        let result = mutate(&mut next)?;
        if changed(&result) {
            self.persist(&next, collection).await?;
            *guard = next;
        }
        Ok(result)
    }

    async fn persist(
        &self,
        state: &HrSnapshot,
        collection: Collection,
    ) -> Result<(), StorageError> {
        match collection {
            Collection::Tickets => write_collection(&self.dir, collection, &state.tickets).await,
            Collection::Requisitions => {
                write_collection(&self.dir, collection, &state.requisitions).await
            }
            Collection::SurveyResponses => {
                write_collection(&self.dir, collection, &state.survey_responses).await
            }
            Collection::StopClock => {
                write_collection(&self.dir, collection, &state.stop_clock_intervals).await
            }
        }
    }
}

async fn load_collection<T: DeserializeOwned>(
    dir: &Path,
    collection: Collection,
) -> Result<Vec<T>, StorageError> {
    let path = dir.join(collection.file_name());
    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(StorageError::Io { path, source }),
    };
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&raw).map_err(|source| StorageError::Serialization { path, source })
}

async fn write_collection<T: Serialize>(
    dir: &Path,
    collection: Collection,
    records: &[T],
) -> Result<(), StorageError> {
    let path = dir.join(collection.file_name());
    let tmp = dir.join(format!("{}.tmp", collection.file_name()));
    let body = serde_json::to_vec_pretty(records).map_err(|source| StorageError::Serialization {
        path: path.clone(),
        source,
    })?;
    tokio::fs::write(&tmp, &body)
        .await
        .map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
    debug!(file = %path.display(), records = records.len(), "collection written");
    Ok(())
}

#[async_trait]
impl HrStorage for JsonFileStorage {
    async fn snapshot(&self) -> Result<HrSnapshot, StorageError> {
        Ok(self.state.read().await.clone())
    }

    async fn insert_ticket(&self, ticket: Ticket) -> Result<(), StorageError> {
        self.commit(
            Collection::Tickets,
            |s| state::insert_ticket(s, ticket),
            |_| true,
        )
        .await
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
        self.commit(
            Collection::Tickets,
            |s| state::update_ticket_status(s, ticket_id, status, now),
            |_| true,
        )
        .await
    }

    async fn insert_requisition(&self, requisition: Requisition) -> Result<(), StorageError> {
        self.commit(
            Collection::Requisitions,
            |s| state::insert_requisition(s, requisition),
            |_| true,
        )
        .await
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
        self.commit(
            Collection::Requisitions,
            |s| state::record_milestone(s, requisition_id, milestone, at),
            |_| true,
        )
        .await
    }

    async fn insert_survey_response(&self, response: SurveyResponse) -> Result<(), StorageError> {
        self.commit(
            Collection::SurveyResponses,
            |s| {
                state::insert_survey_response(s, response);
                Ok(())
            },
            |_| true,
        )
        .await
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
        self.commit(
            Collection::StopClock,
            |s| state::pause_clock(s, ticket_id, reason, now),
            |_| true,
        )
        .await
    }

    async fn resume_clock(
        &self,
        ticket_id: &str,
        now: OffsetDateTime,
    ) -> Result<Option<StopClockInterval>, StorageError> {
        self.commit(
            Collection::StopClock,
            |s| state::resume_clock(s, ticket_id, now),
            Option::is_some,
        )
        .await
    }

    async fn list_stop_intervals(
        &self,
        ticket_id: Option<&str>,
    ) -> Result<Vec<StopClockInterval>, StorageError> {
        Ok(state::list_stop_intervals(&*self.state.read().await, ticket_id))
    }
}
