use std::future::Future;

use hrdesk_core::TicketCategory;

use super::{at_hour, make_ticket, TestResult};
use crate::{HrStorage, StorageError};

pub(super) async fn run_clock_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "clock",
            "pause_opens_interval",
            pause_opens_interval(factory).await,
        ),
        TestResult::from_result(
            "clock",
            "resume_closes_open_interval",
            resume_closes_open_interval(factory).await,
        ),
        TestResult::from_result(
            "clock",
            "resume_without_pause_is_noop",
            resume_without_pause_is_noop(factory).await,
        ),
        TestResult::from_result(
            "clock",
            "resume_closes_latest_open_interval",
            resume_closes_latest_open_interval(factory).await,
        ),
        TestResult::from_result(
            "clock",
            "unknown_ticket_rejected",
            unknown_ticket_rejected(factory).await,
        ),
        TestResult::from_result(
            "clock",
            "intervals_listed_per_ticket",
            intervals_listed_per_ticket(factory).await,
        ),
    ]
}

async fn pause_opens_interval<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    let stop = s
        .pause_clock("tkt_1", "waiting on payroll", at_hour(2))
        .await
        .map_err(|e| e.to_string())?;
    if stop.ticket_id != "tkt_1" || stop.start_at != at_hour(2) || !stop.is_open() {
        return Err(format!("unexpected interval {stop:?}"));
    }
    if stop.reason != "waiting on payroll" {
        return Err(format!("reason not kept: {:?}", stop.reason));
    }
    if !stop.id.starts_with("stop_") {
        return Err(format!("unexpected interval id {}", stop.id));
    }
    Ok(())
}

async fn resume_closes_open_interval<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    let opened = s
        .pause_clock("tkt_1", "", at_hour(2))
        .await
        .map_err(|e| e.to_string())?;
    let closed = s
        .resume_clock("tkt_1", at_hour(5))
        .await
        .map_err(|e| e.to_string())?
        .ok_or("resume closed nothing")?;
    if closed.id != opened.id || closed.end_at != Some(at_hour(5)) {
        return Err(format!("unexpected closed interval {closed:?}"));
    }
    let stored = s
        .list_stop_intervals(Some("tkt_1"))
        .await
        .map_err(|e| e.to_string())?;
    if stored.len() != 1 || stored[0].end_at != Some(at_hour(5)) {
        return Err(format!("stored intervals not closed: {stored:?}"));
    }
    Ok(())
}

async fn resume_without_pause_is_noop<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    let closed = s
        .resume_clock("tkt_1", at_hour(1))
        .await
        .map_err(|e| e.to_string())?;
    if closed.is_some() {
        return Err(format!("expected None, got {closed:?}"));
    }
    let stored = s
        .list_stop_intervals(None)
        .await
        .map_err(|e| e.to_string())?;
    if !stored.is_empty() {
        return Err("no-op resume created an interval".to_string());
    }
    Ok(())
}

/// Two open pauses: resume closes the most recently appended one only.
async fn resume_closes_latest_open_interval<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    let first = s
        .pause_clock("tkt_1", "first", at_hour(1))
        .await
        .map_err(|e| e.to_string())?;
    let second = s
        .pause_clock("tkt_1", "second", at_hour(2))
        .await
        .map_err(|e| e.to_string())?;
    let closed = s
        .resume_clock("tkt_1", at_hour(3))
        .await
        .map_err(|e| e.to_string())?
        .ok_or("resume closed nothing")?;
    if closed.id != second.id {
        return Err(format!("expected {} closed, got {}", second.id, closed.id));
    }
    let stored = s
        .list_stop_intervals(Some("tkt_1"))
        .await
        .map_err(|e| e.to_string())?;
    let still_open: Vec<&str> = stored
        .iter()
        .filter(|i| i.is_open())
        .map(|i| i.id.as_str())
        .collect();
    if still_open != [first.id.as_str()] {
        return Err(format!("expected only {} open, got {still_open:?}", first.id));
    }
    Ok(())
}

async fn unknown_ticket_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.pause_clock("tkt_ghost", "", at_hour(1)).await {
        Err(StorageError::TicketNotFound { ticket_id }) if ticket_id == "tkt_ghost" => {}
        other => return Err(format!("pause: expected TicketNotFound, got {other:?}")),
    }
    match s.resume_clock("tkt_ghost", at_hour(1)).await {
        Err(StorageError::TicketNotFound { .. }) => Ok(()),
        other => Err(format!("resume: expected TicketNotFound, got {other:?}")),
    }
}

async fn intervals_listed_per_ticket<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for id in ["tkt_1", "tkt_2"] {
        s.insert_ticket(make_ticket(id, TicketCategory::Performance)?)
            .await
            .map_err(|e| e.to_string())?;
    }
    s.pause_clock("tkt_1", "", at_hour(1))
        .await
        .map_err(|e| e.to_string())?;
    s.pause_clock("tkt_2", "", at_hour(2))
        .await
        .map_err(|e| e.to_string())?;
    s.pause_clock("tkt_1", "", at_hour(3))
        .await
        .map_err(|e| e.to_string())?;

    let mine = s
        .list_stop_intervals(Some("tkt_1"))
        .await
        .map_err(|e| e.to_string())?;
    if mine.len() != 2 || mine.iter().any(|i| i.ticket_id != "tkt_1") {
        return Err(format!("unexpected intervals for tkt_1: {mine:?}"));
    }
    let all = s
        .list_stop_intervals(None)
        .await
        .map_err(|e| e.to_string())?;
    let starts: Vec<_> = all.iter().map(|i| i.start_at).collect();
    if starts != [at_hour(1), at_hour(2), at_hour(3)] {
        return Err(format!("intervals not in insertion order: {starts:?}"));
    }
    Ok(())
}
