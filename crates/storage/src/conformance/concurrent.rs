use std::future::Future;
use std::sync::Arc;

use hrdesk_core::TicketCategory;

use super::{at_hour, make_ticket, TestResult};
use crate::{HrStorage, StorageError, TicketFilter};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "concurrent",
            "racing_inserts_same_id_exactly_one_wins",
            racing_inserts_same_id_exactly_one_wins(factory).await,
        ),
        TestResult::from_result(
            "concurrent",
            "racing_pauses_all_recorded",
            racing_pauses_all_recorded(factory).await,
        ),
    ]
}

/// N tasks insert a ticket with the same id. Exactly one insert succeeds; the
/// rest must get DuplicateId, and exactly one ticket is stored.
async fn racing_inserts_same_id_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    let ticket = make_ticket("tkt_race", TicketCategory::Hiring)?;

    let mut handles = Vec::new();
    for _ in 0..N {
        let s = storage.clone();
        let t = ticket.clone();
        handles.push(tokio::spawn(async move {
            match s.insert_ticket(t).await {
                Ok(()) => Ok(true),
                Err(StorageError::DuplicateId { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
        if won {
            winners += 1;
        }
    }
    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }

    let stored = storage
        .list_tickets(TicketFilter::default())
        .await
        .map_err(|e| e.to_string())?;
    if stored.len() != 1 {
        return Err(format!("expected 1 stored ticket, got {}", stored.len()));
    }
    Ok(())
}

/// N tasks each pause the same ticket. Every pause lands as its own interval
/// with a distinct id.
async fn racing_pauses_all_recorded<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    storage
        .insert_ticket(make_ticket("tkt_1", TicketCategory::Fairness)?)
        .await
        .map_err(|e| e.to_string())?;

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            s.pause_clock("tkt_1", &format!("pause-{i}"), at_hour(i as i64))
                .await
        }));
    }
    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e| format!("storage error: {e}"))?;
    }

    let mut ids: Vec<String> = storage
        .list_stop_intervals(Some("tkt_1"))
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|i| i.id)
        .collect();
    if ids.len() != N {
        return Err(format!("expected {N} intervals, got {}", ids.len()));
    }
    ids.sort();
    ids.dedup();
    if ids.len() != N {
        return Err("interval ids collided".to_string());
    }
    Ok(())
}
