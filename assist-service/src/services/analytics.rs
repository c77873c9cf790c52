use chrono::{DateTime, Duration, Local};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::{Ticket, TicketStatus};

/// Operator-facing summary statistics, computed from a full snapshot of the
/// ticket collection on every request. O(n) per call; acceptable while the
/// ticket volume stays small.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    /// Mean answer latency in hours, rounded to one decimal. 0 when no
    /// ticket has been answered.
    pub average_response_time: f64,
    /// answered / (answered + rejected), as a rounded integer percent.
    pub resolution_rate: u32,
    /// Tickets created per calendar day over the last 7 days, oldest first.
    pub tickets_per_day: Vec<u32>,
    /// Per-requester ticket counts, descending, top 10.
    pub user_query_distribution: Vec<UserQueryCount>,
    pub total_tickets: usize,
    pub pending_tickets: usize,
    pub answered_tickets: usize,
    /// Distinct requesters by user id.
    pub total_users: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserQueryCount {
    pub email: String,
    pub count: u32,
}

/// Pure aggregation over an in-memory ticket snapshot. `now` anchors the
/// 7-day window; day boundaries fall at local midnight.
pub fn compute_stats(tickets: &[Ticket], now: DateTime<Local>) -> TicketStats {
    let mut total_response_hours = 0.0;
    let mut answered_with_latency = 0usize;
    for ticket in tickets {
        if ticket.status == TicketStatus::Answered {
            if let Some(answered_at) = ticket.answered_at {
                let millis = (answered_at - ticket.created_at).num_milliseconds();
                total_response_hours += millis as f64 / 3_600_000.0;
                answered_with_latency += 1;
            }
        }
    }
    let average_response_time = if answered_with_latency > 0 {
        round_to_tenth(total_response_hours / answered_with_latency as f64)
    } else {
        0.0
    };

    let answered = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Answered)
        .count();
    let rejected = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Rejected)
        .count();
    let processed = answered + rejected;
    let resolution_rate = if processed > 0 {
        (answered as f64 / processed as f64 * 100.0).round() as u32
    } else {
        0
    };

    let today = now.date_naive();
    let tickets_per_day = (0..7)
        .rev()
        .map(|days_back| {
            let day = today - Duration::days(days_back);
            tickets
                .iter()
                .filter(|t| t.created_at.with_timezone(&Local).date_naive() == day)
                .count() as u32
        })
        .collect();

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for ticket in tickets {
        if !ticket.user_email.is_empty() {
            *counts.entry(ticket.user_email.as_str()).or_insert(0) += 1;
        }
    }
    let mut user_query_distribution: Vec<UserQueryCount> = counts
        .into_iter()
        .map(|(email, count)| UserQueryCount {
            email: email.to_string(),
            count,
        })
        .collect();
    user_query_distribution.sort_by(|a, b| b.count.cmp(&a.count).then(a.email.cmp(&b.email)));
    user_query_distribution.truncate(10);

    let total_users = tickets
        .iter()
        .map(|t| t.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    TicketStats {
        average_response_time,
        resolution_rate,
        tickets_per_day,
        user_query_distribution,
        total_tickets: tickets.len(),
        pending_tickets: tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Pending)
            .count(),
        answered_tickets: answered,
        total_users,
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
