//! hrdesk-core: data model for the HR desk service.
//!
//! The entities here are what the storage layer persists and what the KPI
//! engine reads. All timestamps are UTC instants serialized as RFC 3339
//! strings; JSON field names are camelCase.
//!
//! # Public API
//!
//! - [`Ticket`], [`TicketCategory`], [`TicketStatus`]
//! - [`Requisition`], [`Milestone`]
//! - [`StopClockInterval`]
//! - [`SurveyResponse`]
//! - [`HrSnapshot`] -- all four collections as one read snapshot
//! - [`ModelError`]

pub mod error;
pub mod id;
pub mod model;
pub mod snapshot;

pub use error::ModelError;
pub use model::{
    Milestone, Requisition, StopClockInterval, SurveyResponse, Ticket, TicketCategory,
    TicketStatus, MAX_SURVEY_SCORE,
};
pub use snapshot::HrSnapshot;
