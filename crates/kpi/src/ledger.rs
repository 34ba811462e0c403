//! Stop-clock ledger: the per-ticket log of pause/resume events.

use hrdesk_core::StopClockInterval;
use time::OffsetDateTime;

use crate::interval::effective_hours;

/// Insertion-ordered log of stop-clock intervals across all tickets.
///
/// Concurrent pauses on the same ticket are allowed and kept as separate
/// entries. Resuming closes the most recently *appended* open interval for
/// the ticket, regardless of `start_at` ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopClockLedger {
    intervals: Vec<StopClockInterval>,
}

impl StopClockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_intervals(intervals: Vec<StopClockInterval>) -> Self {
        StopClockLedger { intervals }
    }

    pub fn intervals(&self) -> &[StopClockInterval] {
        &self.intervals
    }

    pub fn into_intervals(self) -> Vec<StopClockInterval> {
        self.intervals
    }

    /// Intervals belonging to `ticket_id`, in insertion order.
    pub fn for_ticket<'a>(
        &'a self,
        ticket_id: &'a str,
    ) -> impl Iterator<Item = &'a StopClockInterval> + 'a {
        self.intervals.iter().filter(move |s| s.ticket_id == ticket_id)
    }

    /// Whether `ticket_id` has at least one open interval.
    pub fn is_paused(&self, ticket_id: &str) -> bool {
        self.for_ticket(ticket_id).any(StopClockInterval::is_open)
    }

    /// Append an open interval starting at `now`.
    pub fn pause(
        &mut self,
        id: String,
        ticket_id: &str,
        reason: impl Into<String>,
        now: OffsetDateTime,
    ) -> &StopClockInterval {
        self.intervals.push(StopClockInterval {
            id,
            ticket_id: ticket_id.to_string(),
            start_at: now,
            end_at: None,
            reason: reason.into(),
        });
        &self.intervals[self.intervals.len() - 1]
    }

    /// Close the latest-appended open interval for `ticket_id` at `now`.
    ///
    /// Returns the closed interval, or `None` when the ticket has nothing
    /// open (a no-op).
    pub fn resume(&mut self, ticket_id: &str, now: OffsetDateTime) -> Option<&StopClockInterval> {
        let open = self
            .intervals
            .iter_mut()
            .rev()
            .find(|s| s.ticket_id == ticket_id && s.is_open())?;
        open.end_at = Some(now);
        Some(&*open)
    }

    /// Hours in `[start, end]` for `ticket_id`, excluding its stops.
    pub fn effective_hours(
        &self,
        ticket_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
        now: OffsetDateTime,
    ) -> f64 {
        effective_hours(ticket_id, start, end, &self.intervals, now)
    }
}

impl From<Vec<StopClockInterval>> for StopClockLedger {
    fn from(intervals: Vec<StopClockInterval>) -> Self {
        Self::from_intervals(intervals)
    }
}
