//! HR desk entities.
//!
//! These are plain records. Storage owns the collections; the KPI engine
//! reads them through [`crate::HrSnapshot`] and never mutates them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ModelError;

/// Highest score an eNPS survey response may carry.
pub const MAX_SURVEY_SCORE: u8 = 10;

// ── Tickets ──────────────────────────────────────────────────────────────────

/// What a ticket is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketCategory {
    Hiring,
    Onboarding,
    Performance,
    Fairness,
    Other,
}

impl TicketCategory {
    pub const ALL: [TicketCategory; 5] = [
        TicketCategory::Hiring,
        TicketCategory::Onboarding,
        TicketCategory::Performance,
        TicketCategory::Fairness,
        TicketCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketCategory::Hiring => "Hiring",
            TicketCategory::Onboarding => "Onboarding",
            TicketCategory::Performance => "Performance",
            TicketCategory::Fairness => "Fairness",
            TicketCategory::Other => "Other",
        }
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown ticket category '{}'", s))
    }
}

/// Where a ticket is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "InProgress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }

    /// `Open` and `InProgress` are active; `Resolved` and `Closed` are not.
    pub fn is_active(self) -> bool {
        matches!(self, TicketStatus::Open | TicketStatus::InProgress)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown ticket status '{}'", s))
    }
}

/// A trackable HR case.
///
/// Invariant: `closed_at`, when present, is not earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub category: TicketCategory,
    pub status: TicketStatus,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque identity handle of whoever filed the ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
}

impl Ticket {
    /// A new `Open` ticket created at `now`.
    pub fn open(
        id: String,
        category: TicketCategory,
        title: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<Self, ModelError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModelError::EmptyField { field: "title" });
        }
        Ok(Ticket {
            id,
            category,
            status: TicketStatus::Open,
            title,
            description: None,
            requester: None,
            created_at: now,
            closed_at: None,
        })
    }

    /// Move the ticket to `status`.
    ///
    /// Leaving the active states stamps `closed_at` with `now` unless the
    /// ticket is already closed (Resolved -> Closed keeps the first closure).
    /// Returning to an active state clears `closed_at`.
    pub fn set_status(
        &mut self,
        status: TicketStatus,
        now: OffsetDateTime,
    ) -> Result<(), ModelError> {
        if status.is_active() {
            self.closed_at = None;
        } else if self.closed_at.is_none() {
            if now < self.created_at {
                return Err(ModelError::ClosedBeforeCreated {
                    ticket_id: self.id.clone(),
                    created_at: self.created_at,
                    closed_at: now,
                });
            }
            self.closed_at = Some(now);
        }
        self.status = status;
        Ok(())
    }

    /// Check the closure invariant on a record built outside [`Ticket::open`].
    pub fn check_closure(&self) -> Result<(), ModelError> {
        match self.closed_at {
            Some(closed_at) if closed_at < self.created_at => {
                Err(ModelError::ClosedBeforeCreated {
                    ticket_id: self.id.clone(),
                    created_at: self.created_at,
                    closed_at,
                })
            }
            _ => Ok(()),
        }
    }
}

// ── Requisitions ─────────────────────────────────────────────────────────────

/// The four hiring-pipeline milestones, in expected chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Milestone {
    Approved,
    FirstInterview,
    OfferSigned,
    Onboarded,
}

impl Milestone {
    pub const ORDER: [Milestone; 4] = [
        Milestone::Approved,
        Milestone::FirstInterview,
        Milestone::OfferSigned,
        Milestone::Onboarded,
    ];

    pub const NAMES: [&'static str; 4] = ["approved", "firstInterview", "offerSigned", "onboarded"];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Milestone {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Milestone::ORDER
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownMilestone(s.to_string()))
    }
}

/// Hiring-pipeline record attached to a ticket.
///
/// `ticket_id` is not enforced as a foreign key; orphaned references are
/// tolerated everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requisition {
    pub id: String,
    pub ticket_id: String,
    #[serde(default)]
    pub key_role: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub approved_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub first_interview_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub offer_signed_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub onboarded_at: Option<OffsetDateTime>,
}

impl Requisition {
    pub fn new(id: String, ticket_id: String, key_role: bool) -> Self {
        Requisition {
            id,
            ticket_id,
            key_role,
            approved_at: None,
            first_interview_at: None,
            offer_signed_at: None,
            onboarded_at: None,
        }
    }

    pub fn milestone(&self, milestone: Milestone) -> Option<OffsetDateTime> {
        match milestone {
            Milestone::Approved => self.approved_at,
            Milestone::FirstInterview => self.first_interview_at,
            Milestone::OfferSigned => self.offer_signed_at,
            Milestone::Onboarded => self.onboarded_at,
        }
    }

    pub fn record_milestone(&mut self, milestone: Milestone, at: OffsetDateTime) {
        let slot = match milestone {
            Milestone::Approved => &mut self.approved_at,
            Milestone::FirstInterview => &mut self.first_interview_at,
            Milestone::OfferSigned => &mut self.offer_signed_at,
            Milestone::Onboarded => &mut self.onboarded_at,
        };
        *slot = Some(at);
    }

    /// First recorded milestone that is earlier than the latest recorded
    /// milestone before it. Missing milestones are skipped.
    pub fn out_of_order_milestone(&self) -> Option<Milestone> {
        let mut latest: Option<OffsetDateTime> = None;
        for m in Milestone::ORDER {
            let Some(at) = self.milestone(m) else {
                continue;
            };
            if latest.is_some_and(|prev| at < prev) {
                return Some(m);
            }
            latest = Some(latest.map_or(at, |prev| prev.max(at)));
        }
        None
    }
}

// ── Stop clock ───────────────────────────────────────────────────────────────

/// A pause period during which SLA time does not count against a ticket.
///
/// `end_at == None` means the pause is still running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopClockInterval {
    pub id: String,
    pub ticket_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub reason: String,
}

impl StopClockInterval {
    pub fn is_open(&self) -> bool {
        self.end_at.is_none()
    }

    /// End instant for overlap purposes: open intervals run until `now`.
    pub fn end_or(&self, now: OffsetDateTime) -> OffsetDateTime {
        self.end_at.unwrap_or(now)
    }
}

// ── Surveys ──────────────────────────────────────────────────────────────────

/// A single eNPS survey answer. Immutable once recorded.
///
/// Deserialization goes through [`SurveyResponse::new`], so stored records
/// are range-checked on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSurveyResponse")]
pub struct SurveyResponse {
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SurveyResponse {
    pub fn new(score: i64, comment: Option<String>) -> Result<Self, ModelError> {
        if !(0..=i64::from(MAX_SURVEY_SCORE)).contains(&score) {
            return Err(ModelError::ScoreOutOfRange { score });
        }
        Ok(SurveyResponse {
            score: score as u8,
            comment: comment.filter(|c| !c.trim().is_empty()),
        })
    }
}

#[derive(Deserialize)]
struct RawSurveyResponse {
    score: i64,
    #[serde(default)]
    comment: Option<String>,
}

impl TryFrom<RawSurveyResponse> for SurveyResponse {
    type Error = ModelError;

    fn try_from(raw: RawSurveyResponse) -> Result<Self, Self::Error> {
        SurveyResponse::new(raw.score, raw.comment)
    }
}
