use crate::domain::{settings::DEFAULT_ALLOWED_DAYS, SlaConfig, Ticket};
use chrono::{DateTime, Utc};
use tracing::debug;

const DAY_MS: f64 = 86_400_000.0;

/// Whole days since `since`, rounded up. A ticket opened an hour ago is one day old.
pub fn age_in_days(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - since).num_milliseconds() as f64;
    (elapsed / DAY_MS).ceil() as i64
}

/// Days the ticket's priority is allowed before it breaches SLA
pub fn allowed_days(ticket: &Ticket, sla: &SlaConfig) -> u32 {
    match sla.get(&ticket.priority) {
        Some(days) => days,
        None => {
            debug!(
                ticket = %ticket.id,
                priority = %ticket.priority,
                fallback = DEFAULT_ALLOWED_DAYS,
                "No SLA configured for priority"
            );
            DEFAULT_ALLOWED_DAYS
        }
    }
}

/// An active ticket is overdue once its age exceeds the SLA allowance.
/// Resolved and rejected tickets are never overdue.
pub fn is_overdue(ticket: &Ticket, sla: &SlaConfig, now: DateTime<Utc>) -> bool {
    if !ticket.is_active() {
        return false;
    }
    age_in_days(ticket.created_at, now) > i64::from(allowed_days(ticket, sla))
}
