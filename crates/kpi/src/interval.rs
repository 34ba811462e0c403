//! Interval arithmetic for the stop-clock model.

use hrdesk_core::StopClockInterval;
use time::{Duration, OffsetDateTime};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Length of the intersection of `[a_start, a_end]` and `[b_start, b_end]`.
///
/// Disjoint, degenerate, or reversed ranges yield `Duration::ZERO`; the
/// result is never negative. Symmetric in `a` and `b`.
pub fn overlap_duration(
    a_start: OffsetDateTime,
    a_end: OffsetDateTime,
    b_start: OffsetDateTime,
    b_end: OffsetDateTime,
) -> Duration {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if end > start {
        end - start
    } else {
        Duration::ZERO
    }
}

/// Signed length of `start -> end` in fractional hours.
pub fn hours_between(start: OffsetDateTime, end: OffsetDateTime) -> f64 {
    (end - start).as_seconds_f64() / SECONDS_PER_HOUR
}

/// Hours in `[window_start, window_end]` not covered by `ticket_id`'s stops.
///
/// Each stop belonging to the ticket is clamped to the window and its
/// overlap subtracted independently; stops that overlap one another are not
/// merged first, so shared time is subtracted once per stop. Open stops run
/// until `now`. The result is floored at zero, and a window with
/// `window_end <= window_start` is zero.
pub fn effective_hours<'a, I>(
    ticket_id: &str,
    window_start: OffsetDateTime,
    window_end: OffsetDateTime,
    stops: I,
    now: OffsetDateTime,
) -> f64
where
    I: IntoIterator<Item = &'a StopClockInterval>,
{
    if window_end <= window_start {
        return 0.0;
    }

    let paused: Duration = stops
        .into_iter()
        .filter(|s| s.ticket_id == ticket_id)
        .map(|s| overlap_duration(window_start, window_end, s.start_at, s.end_or(now)))
        .fold(Duration::ZERO, |acc, d| acc + d);

    let total = window_end - window_start;
    ((total - paused).as_seconds_f64() / SECONDS_PER_HOUR).max(0.0)
}
