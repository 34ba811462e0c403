//! Conformance test suite for `HrStorage` implementations.
//!
//! A backend-agnostic suite that any `HrStorage` implementation can run to
//! verify it behaves like the reference in-memory backend. The suite covers:
//!
//! - **Tickets**: insertion order, duplicate ids, status transitions, filters
//! - **Requisitions**: milestone recording, missing-record errors
//! - **Stop clock**: pause/resume pairing, unknown tickets, no-op resume
//! - **Snapshots**: consistency and isolation from later writes
//! - **Concurrency**: racing inserts and pauses through a shared handle
//!
//! # Usage
//!
//! ```ignore
//! use hrdesk_storage::conformance::run_conformance_suite;
//! use hrdesk_storage::MemoryStorage;
//!
//! #[tokio::test]
//! async fn memory_conformance() {
//!     let report = run_conformance_suite(|| async { MemoryStorage::new() }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod clock;
mod concurrent;
mod requisitions;
mod snapshot;
mod tickets;

use std::fmt;
use std::future::Future;

use hrdesk_core::{Requisition, Ticket, TicketCategory};
use time::macros::datetime;
use time::OffsetDateTime;

use crate::HrStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "tickets", "clock").
    pub category: String,
    /// Test name (e.g. "duplicate_ticket_rejected").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// `factory` is called once per test and must return a fresh, empty backend.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: HrStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(tickets::run_ticket_tests(&factory).await);
    results.extend(requisitions::run_requisition_tests(&factory).await);
    results.extend(clock::run_clock_tests(&factory).await);
    results.extend(snapshot::run_snapshot_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

const T0: OffsetDateTime = datetime!(2025-06-02 08:00 UTC);

fn at_hour(hours: i64) -> OffsetDateTime {
    T0 + time::Duration::hours(hours)
}

fn make_ticket(id: &str, category: TicketCategory) -> Result<Ticket, String> {
    Ticket::open(id.to_string(), category, format!("{category} case {id}"), T0)
        .map_err(|e| e.to_string())
}

fn make_requisition(id: &str, ticket_id: &str) -> Requisition {
    Requisition::new(id.to_string(), ticket_id.to_string(), true)
}
