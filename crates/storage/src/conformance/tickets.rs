use std::future::Future;

use hrdesk_core::{TicketCategory, TicketStatus};

use super::{at_hour, make_ticket, TestResult};
use crate::{HrStorage, StorageError, TicketFilter};

pub(super) async fn run_ticket_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "tickets",
            "inserted_ticket_readable",
            inserted_ticket_readable(factory).await,
        ),
        TestResult::from_result(
            "tickets",
            "list_preserves_insertion_order",
            list_preserves_insertion_order(factory).await,
        ),
        TestResult::from_result(
            "tickets",
            "duplicate_ticket_rejected",
            duplicate_ticket_rejected(factory).await,
        ),
        TestResult::from_result(
            "tickets",
            "missing_ticket_not_found",
            missing_ticket_not_found(factory).await,
        ),
        TestResult::from_result(
            "tickets",
            "closing_stamps_closed_at",
            closing_stamps_closed_at(factory).await,
        ),
        TestResult::from_result(
            "tickets",
            "reopening_clears_closed_at",
            reopening_clears_closed_at(factory).await,
        ),
        TestResult::from_result(
            "tickets",
            "closing_before_creation_rejected",
            closing_before_creation_rejected(factory).await,
        ),
        TestResult::from_result(
            "tickets",
            "filters_by_category_and_status",
            filters_by_category_and_status(factory).await,
        ),
    ]
}

async fn inserted_ticket_readable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let ticket = make_ticket("tkt_1", TicketCategory::Performance)?;
    s.insert_ticket(ticket.clone())
        .await
        .map_err(|e| e.to_string())?;

    let read = s.get_ticket("tkt_1").await.map_err(|e| e.to_string())?;
    if read != ticket {
        return Err(format!("expected {ticket:?}, got {read:?}"));
    }
    Ok(())
}

async fn list_preserves_insertion_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for id in ["tkt_c", "tkt_a", "tkt_b"] {
        s.insert_ticket(make_ticket(id, TicketCategory::Other)?)
            .await
            .map_err(|e| e.to_string())?;
    }
    let ids: Vec<String> = s
        .list_tickets(TicketFilter::default())
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|t| t.id)
        .collect();
    if ids != ["tkt_c", "tkt_a", "tkt_b"] {
        return Err(format!("unexpected order {ids:?}"));
    }
    Ok(())
}

async fn duplicate_ticket_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Hiring)?)
        .await
        .map_err(|e| e.to_string())?;
    match s
        .insert_ticket(make_ticket("tkt_1", TicketCategory::Performance)?)
        .await
    {
        Err(StorageError::DuplicateId { kind: "ticket", id }) if id == "tkt_1" => {}
        other => return Err(format!("expected DuplicateId, got {other:?}")),
    }
    let kept = s.get_ticket("tkt_1").await.map_err(|e| e.to_string())?;
    if kept.category != TicketCategory::Hiring {
        return Err("duplicate insert overwrote the original ticket".to_string());
    }
    Ok(())
}

async fn missing_ticket_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get_ticket("tkt_nope").await {
        Err(StorageError::TicketNotFound { ticket_id }) if ticket_id == "tkt_nope" => {}
        other => return Err(format!("get: expected TicketNotFound, got {other:?}")),
    }
    match s
        .update_ticket_status("tkt_nope", TicketStatus::Closed, at_hour(1))
        .await
    {
        Err(StorageError::TicketNotFound { .. }) => Ok(()),
        other => Err(format!("update: expected TicketNotFound, got {other:?}")),
    }
}

async fn closing_stamps_closed_at<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    let resolved = s
        .update_ticket_status("tkt_1", TicketStatus::Resolved, at_hour(10))
        .await
        .map_err(|e| e.to_string())?;
    if resolved.closed_at != Some(at_hour(10)) {
        return Err(format!("expected closedAt at +10h, got {:?}", resolved.closed_at));
    }
    let closed = s
        .update_ticket_status("tkt_1", TicketStatus::Closed, at_hour(20))
        .await
        .map_err(|e| e.to_string())?;
    if closed.closed_at != Some(at_hour(10)) {
        return Err("Resolved -> Closed moved closedAt".to_string());
    }
    let stored = s.get_ticket("tkt_1").await.map_err(|e| e.to_string())?;
    if stored.status != TicketStatus::Closed {
        return Err(format!("stored status is {}", stored.status));
    }
    Ok(())
}

async fn reopening_clears_closed_at<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    s.update_ticket_status("tkt_1", TicketStatus::Closed, at_hour(4))
        .await
        .map_err(|e| e.to_string())?;
    let reopened = s
        .update_ticket_status("tkt_1", TicketStatus::InProgress, at_hour(5))
        .await
        .map_err(|e| e.to_string())?;
    if reopened.closed_at.is_some() {
        return Err("reopened ticket kept closedAt".to_string());
    }
    Ok(())
}

async fn closing_before_creation_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    match s
        .update_ticket_status("tkt_1", TicketStatus::Closed, at_hour(-1))
        .await
    {
        Err(StorageError::InvalidRecord(_)) => {}
        other => return Err(format!("expected InvalidRecord, got {other:?}")),
    }
    let stored = s.get_ticket("tkt_1").await.map_err(|e| e.to_string())?;
    if stored.status != TicketStatus::Open || stored.closed_at.is_some() {
        return Err("rejected update still modified the ticket".to_string());
    }
    Ok(())
}

async fn filters_by_category_and_status<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_ticket(make_ticket("tkt_f1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    s.insert_ticket(make_ticket("tkt_f2", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;
    s.insert_ticket(make_ticket("tkt_h1", TicketCategory::Hiring)?)
        .await
        .map_err(|e| e.to_string())?;
    s.update_ticket_status("tkt_f2", TicketStatus::Closed, at_hour(3))
        .await
        .map_err(|e| e.to_string())?;

    let fairness = s
        .list_tickets(TicketFilter {
            category: Some(TicketCategory::Fairness),
            status: None,
        })
        .await
        .map_err(|e| e.to_string())?;
    if fairness.len() != 2 {
        return Err(format!("expected 2 fairness tickets, got {}", fairness.len()));
    }

    let open_fairness = s
        .list_tickets(TicketFilter {
            category: Some(TicketCategory::Fairness),
            status: Some(TicketStatus::Open),
        })
        .await
        .map_err(|e| e.to_string())?;
    if open_fairness.len() != 1 || open_fairness[0].id != "tkt_f1" {
        return Err(format!("unexpected open fairness tickets {open_fairness:?}"));
    }
    Ok(())
}
