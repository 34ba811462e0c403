use std::future::Future;

use hrdesk_core::{HrSnapshot, Milestone, SurveyResponse, TicketCategory};

use super::{at_hour, make_requisition, make_ticket, TestResult};
use crate::HrStorage;

pub(super) async fn run_snapshot_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "snapshot",
            "empty_backend_yields_empty_snapshot",
            empty_backend_yields_empty_snapshot(factory).await,
        ),
        TestResult::from_result(
            "snapshot",
            "snapshot_reflects_every_collection",
            snapshot_reflects_every_collection(factory).await,
        ),
        TestResult::from_result(
            "snapshot",
            "snapshot_unaffected_by_later_writes",
            snapshot_unaffected_by_later_writes(factory).await,
        ),
        TestResult::from_result(
            "snapshot",
            "survey_responses_kept_in_order",
            survey_responses_kept_in_order(factory).await,
        ),
    ]
}

async fn empty_backend_yields_empty_snapshot<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let snap = s.snapshot().await.map_err(|e| e.to_string())?;
    if snap != HrSnapshot::default() {
        return Err(format!("fresh backend not empty: {snap:?}"));
    }
    Ok(())
}

async fn snapshot_reflects_every_collection<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Hiring)?)
        .await
        .map_err(|e| e.to_string())?;
    s.insert_requisition(make_requisition("req_1", "tkt_1"))
        .await
        .map_err(|e| e.to_string())?;
    s.record_milestone("req_1", Milestone::Approved, at_hour(1))
        .await
        .map_err(|e| e.to_string())?;
    s.pause_clock("tkt_1", "", at_hour(2))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_survey_response(SurveyResponse::new(9, None).map_err(|e| e.to_string())?)
        .await
        .map_err(|e| e.to_string())?;

    let snap = s.snapshot().await.map_err(|e| e.to_string())?;
    if snap.tickets.len() != 1
        || snap.requisitions.len() != 1
        || snap.stop_clock_intervals.len() != 1
        || snap.survey_responses.len() != 1
    {
        return Err(format!("snapshot missing records: {snap:?}"));
    }
    if snap.requisitions[0].approved_at != Some(at_hour(1)) {
        return Err("snapshot holds a stale requisition".to_string());
    }
    Ok(())
}

async fn snapshot_unaffected_by_later_writes<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    let before = s.snapshot().await.map_err(|e| e.to_string())?;

    s.insert_ticket(make_ticket("tkt_2", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    s.pause_clock("tkt_1", "", at_hour(1))
        .await
        .map_err(|e| e.to_string())?;

    if before.tickets.len() != 1 || !before.stop_clock_intervals.is_empty() {
        return Err("earlier snapshot observed later writes".to_string());
    }
    Ok(())
}

async fn survey_responses_kept_in_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for score in [3, 10, 7] {
        s.insert_survey_response(SurveyResponse::new(score, None).map_err(|e| e.to_string())?)
            .await
            .map_err(|e| e.to_string())?;
    }
    let scores: Vec<u8> = s
        .list_survey_responses()
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|r| r.score)
        .collect();
    if scores != [3, 10, 7] {
        return Err(format!("unexpected order {scores:?}"));
    }
    Ok(())
}
