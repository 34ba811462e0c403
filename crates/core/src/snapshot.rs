use serde::{Deserialize, Serialize};

use crate::model::{Requisition, StopClockInterval, SurveyResponse, Ticket};

/// All four entity collections, in insertion order.
///
/// Storage hands one of these out per read so that a report is always
/// computed over a consistent copy, never over collections that are being
/// mutated underneath it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrSnapshot {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub requisitions: Vec<Requisition>,
    #[serde(default)]
    pub survey_responses: Vec<SurveyResponse>,
    #[serde(default)]
    pub stop_clock_intervals: Vec<StopClockInterval>,
}

impl HrSnapshot {
    pub fn ticket(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn requisition(&self, id: &str) -> Option<&Requisition> {
        self.requisitions.iter().find(|r| r.id == id)
    }

    /// Stop intervals recorded against `ticket_id`, in insertion order.
    pub fn stops_for<'a>(
        &'a self,
        ticket_id: &'a str,
    ) -> impl Iterator<Item = &'a StopClockInterval> + 'a {
        self.stop_clock_intervals
            .iter()
            .filter(move |s| s.ticket_id == ticket_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TicketCategory;
    use time::macros::datetime;

    #[test]
    fn lookups_and_stop_filter() {
        let mut snap = HrSnapshot::default();
        snap.tickets.push(
            Ticket::open(
                "tkt_a".to_string(),
                TicketCategory::Hiring,
                "Data analyst",
                datetime!(2025-01-01 00:00 UTC),
            )
            .unwrap(),
        );
        for (id, ticket) in [("stop_1", "tkt_a"), ("stop_2", "tkt_b"), ("stop_3", "tkt_a")] {
            snap.stop_clock_intervals.push(StopClockInterval {
                id: id.to_string(),
                ticket_id: ticket.to_string(),
                start_at: datetime!(2025-01-02 00:00 UTC),
                end_at: None,
                reason: String::new(),
            });
        }

        assert!(snap.ticket("tkt_a").is_some());
        assert!(snap.ticket("tkt_b").is_none());
        assert!(snap.requisition("req_x").is_none());
        let ids: Vec<&str> = snap.stops_for("tkt_a").map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["stop_1", "stop_3"]);
    }

    #[test]
    fn empty_json_object_is_an_empty_snapshot() {
        let snap: HrSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snap, HrSnapshot::default());
    }
}
