use std::future::Future;

use hrdesk_core::Milestone;

use super::{at_hour, make_requisition, TestResult};
use crate::{HrStorage, StorageError};

pub(super) async fn run_requisition_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "requisitions",
            "orphan_requisition_accepted",
            orphan_requisition_accepted(factory).await,
        ),
        TestResult::from_result(
            "requisitions",
            "duplicate_requisition_rejected",
            duplicate_requisition_rejected(factory).await,
        ),
        TestResult::from_result(
            "requisitions",
            "milestones_recorded_independently",
            milestones_recorded_independently(factory).await,
        ),
        TestResult::from_result(
            "requisitions",
            "out_of_order_milestone_still_stored",
            out_of_order_milestone_still_stored(factory).await,
        ),
        TestResult::from_result(
            "requisitions",
            "missing_requisition_not_found",
            missing_requisition_not_found(factory).await,
        ),
    ]
}

/// The owning ticket is not a foreign key.
async fn orphan_requisition_accepted<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_requisition(make_requisition("req_1", "tkt_missing"))
        .await
        .map_err(|e| e.to_string())?;
    let all = s.list_requisitions().await.map_err(|e| e.to_string())?;
    if all.len() != 1 || all[0].ticket_id != "tkt_missing" {
        return Err(format!("unexpected requisitions {all:?}"));
    }
    Ok(())
}

async fn duplicate_requisition_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_requisition(make_requisition("req_1", "tkt_1"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_requisition(make_requisition("req_1", "tkt_2")).await {
        Err(StorageError::DuplicateId {
            kind: "requisition",
            ..
        }) => Ok(()),
        other => Err(format!("expected DuplicateId, got {other:?}")),
    }
}

async fn milestones_recorded_independently<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_requisition(make_requisition("req_1", "tkt_1"))
        .await
        .map_err(|e| e.to_string())?;
    s.record_milestone("req_1", Milestone::Approved, at_hour(1))
        .await
        .map_err(|e| e.to_string())?;
    let updated = s
        .record_milestone("req_1", Milestone::FirstInterview, at_hour(30))
        .await
        .map_err(|e| e.to_string())?;

    if updated.approved_at != Some(at_hour(1)) || updated.first_interview_at != Some(at_hour(30))
    {
        return Err(format!("unexpected milestones {updated:?}"));
    }
    if updated.offer_signed_at.is_some() || updated.onboarded_at.is_some() {
        return Err("unrecorded milestones were set".to_string());
    }
    let stored = s.get_requisition("req_1").await.map_err(|e| e.to_string())?;
    if stored != updated {
        return Err("returned requisition differs from stored one".to_string());
    }
    Ok(())
}

async fn out_of_order_milestone_still_stored<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_requisition(make_requisition("req_1", "tkt_1"))
        .await
        .map_err(|e| e.to_string())?;
    s.record_milestone("req_1", Milestone::OfferSigned, at_hour(50))
        .await
        .map_err(|e| e.to_string())?;
    let updated = s
        .record_milestone("req_1", Milestone::FirstInterview, at_hour(60))
        .await
        .map_err(|e| e.to_string())?;
    if updated.out_of_order_milestone() != Some(Milestone::OfferSigned) {
        return Err(format!("expected offerSigned flagged, got {updated:?}"));
    }
    Ok(())
}

async fn missing_requisition_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s
        .record_milestone("req_nope", Milestone::Onboarded, at_hour(1))
        .await
    {
        Err(StorageError::RequisitionNotFound { requisition_id })
            if requisition_id == "req_nope" =>
        {
            Ok(())
        }
        other => Err(format!("expected RequisitionNotFound, got {other:?}")),
    }
}
