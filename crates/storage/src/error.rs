use std::path::PathBuf;

use hrdesk_core::ModelError;

/// All errors that can be returned by an HrStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No ticket with the given id.
    #[error("ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: String },

    /// No requisition with the given id.
    #[error("requisition not found: {requisition_id}")]
    RequisitionNotFound { requisition_id: String },

    /// A record with this id already exists in the collection.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    /// The mutation would violate an entity invariant.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] ModelError),

    /// Reading or writing a collection file failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file did not contain valid JSON for its records.
    #[error("malformed collection file {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn ticket_not_found(ticket_id: &str) -> Self {
        StorageError::TicketNotFound {
            ticket_id: ticket_id.to_string(),
        }
    }

    pub(crate) fn requisition_not_found(requisition_id: &str) -> Self {
        StorageError::RequisitionNotFound {
            requisition_id: requisition_id.to_string(),
        }
    }
}
