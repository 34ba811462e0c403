//! The KPI report.
//!
//! Five metrics, each computed independently from the input snapshot and
//! each independently `None` when the data needed to define it is absent.
//! Records missing an optional field are filtered out of a metric, never
//! counted as zero and never treated as an error.

use hrdesk_core::{
    HrSnapshot, Requisition, StopClockInterval, SurveyResponse, Ticket, TicketCategory,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::interval::{effective_hours, hours_between};
use crate::stats::{average, percentage};

/// Effective-hours threshold for a Fairness ticket to count as closed in time.
pub const FAIRNESS_CLOSE_HOURS: f64 = 72.0;

/// Fixed value reported for the candidate pool multiple while hiring is active.
///
/// Placeholder until a real candidate-pipeline model exists.
const POOL_MULTIPLE_PLACEHOLDER: u32 = 3;

const PROMOTER_MIN_SCORE: u8 = 9;
const DETRACTOR_MAX_SCORE: u8 = 6;

/// Output of [`compute_report`]. Serializes as
/// `{ ttp, ttf, close72Rate, poolMultiple, eNPS }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiReport {
    /// Mean hours from first interview to signed offer, key roles only.
    pub ttp: Option<f64>,
    /// Mean hours from approval to onboarding.
    pub ttf: Option<f64>,
    /// Percentage of Fairness tickets closed within 72 effective hours.
    pub close72_rate: Option<i64>,
    /// Candidate pool multiple.
    pub pool_multiple: Option<u32>,
    /// Employee Net Promoter Score, -100..=100.
    #[serde(rename = "eNPS")]
    pub enps: Option<i64>,
}

/// Compute every KPI over read-only snapshots of the four collections.
///
/// `now` bounds open-ended stop intervals; it is the only time input, so
/// the same arguments always produce the same report.
pub fn compute_report(
    tickets: &[Ticket],
    requisitions: &[Requisition],
    survey_responses: &[SurveyResponse],
    stop_clock_intervals: &[StopClockInterval],
    now: OffsetDateTime,
) -> KpiReport {
    KpiReport {
        ttp: time_to_offer(requisitions),
        ttf: time_to_fill(requisitions),
        close72_rate: fairness_close_rate(tickets, stop_clock_intervals, now),
        pool_multiple: pool_multiple(tickets),
        enps: employee_nps(survey_responses),
    }
}

/// [`compute_report`] over an [`HrSnapshot`].
pub fn compute_snapshot_report(snapshot: &HrSnapshot, now: OffsetDateTime) -> KpiReport {
    compute_report(
        &snapshot.tickets,
        &snapshot.requisitions,
        &snapshot.survey_responses,
        &snapshot.stop_clock_intervals,
        now,
    )
}

/// Average of `offer_signed_at - first_interview_at` over key-role
/// requisitions that have both milestones.
pub fn time_to_offer(requisitions: &[Requisition]) -> Option<f64> {
    average(requisitions.iter().filter(|r| r.key_role).filter_map(|r| {
        Some(hours_between(r.first_interview_at?, r.offer_signed_at?))
    }))
}

/// Average of `onboarded_at - approved_at` over requisitions that have both
/// milestones, key role or not.
pub fn time_to_fill(requisitions: &[Requisition]) -> Option<f64> {
    average(
        requisitions
            .iter()
            .filter_map(|r| Some(hours_between(r.approved_at?, r.onboarded_at?))),
    )
}

/// Percentage of Fairness tickets that are closed and whose effective
/// creation-to-closure time is at most [`FAIRNESS_CLOSE_HOURS`].
///
/// The denominator counts every Fairness ticket, open ones included.
pub fn fairness_close_rate(
    tickets: &[Ticket],
    stops: &[StopClockInterval],
    now: OffsetDateTime,
) -> Option<i64> {
    let fairness: Vec<&Ticket> = tickets
        .iter()
        .filter(|t| t.category == TicketCategory::Fairness)
        .collect();

    let within = fairness
        .iter()
        .filter(|t| {
            t.closed_at.is_some_and(|closed| {
                effective_hours(&t.id, t.created_at, closed, stops, now) <= FAIRNESS_CLOSE_HOURS
            })
        })
        .count();

    percentage(within, fairness.len())
}

/// Placeholder: a constant multiple whenever any Hiring ticket is Open or
/// InProgress, otherwise undefined.
pub fn pool_multiple(tickets: &[Ticket]) -> Option<u32> {
    tickets
        .iter()
        .any(|t| t.category == TicketCategory::Hiring && t.status.is_active())
        .then_some(POOL_MULTIPLE_PLACEHOLDER)
}

/// `round((promoters - detractors) / total * 100)`; `None` with no responses.
///
/// Promoters score 9-10, detractors 0-6. Rounds half away from zero.
pub fn employee_nps(responses: &[SurveyResponse]) -> Option<i64> {
    if responses.is_empty() {
        return None;
    }
    let total = responses.len() as f64;
    let promoters = responses
        .iter()
        .filter(|r| r.score >= PROMOTER_MIN_SCORE)
        .count() as f64;
    let detractors = responses
        .iter()
        .filter(|r| r.score <= DETRACTOR_MAX_SCORE)
        .count() as f64;
    Some(((promoters / total - detractors / total) * 100.0).round() as i64)
}
