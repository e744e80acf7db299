use crate::domain::ticket::{Priority, Ticket, TicketStatus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Customer,
    Status,
    Priority,
    Created,
    Scheduled,
    Store,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortField::Id),
            "customer" => Ok(SortField::Customer),
            "status" => Ok(SortField::Status),
            "priority" => Ok(SortField::Priority),
            "created" | "date" => Ok(SortField::Created),
            "scheduled" => Ok(SortField::Scheduled),
            "store" => Ok(SortField::Store),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: id, customer, status, priority, created, scheduled, store",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts tickets in place by the given field and direction.
///
/// Tickets without a scheduled date always sort last when sorting by
/// [`SortField::Scheduled`], regardless of direction.
///
/// # Examples
/// ```
/// use infofix_core::domain::sorting::{sort_tickets, SortField, SortOrder};
/// use infofix_core::domain::customer::CustomerId;
/// use infofix_core::domain::ticket::{Device, Ticket, TicketId};
///
/// let make = |n| Ticket::new(TicketId::new(n), CustomerId::new(), "Ama", Device::default(), "Osu");
/// let mut tickets = vec![make(3), make(1), make(2)];
///
/// sort_tickets(&mut tickets, SortField::Id, SortOrder::Ascending);
/// assert_eq!(tickets[0].id.as_str(), "IFX1");
/// ```
pub fn sort_tickets(tickets: &mut [Ticket], field: SortField, order: SortOrder) {
    tickets.sort_by(|a, b| {
        if field == SortField::Scheduled {
            return compare_option_dates(a.scheduled_at, b.scheduled_at, order);
        }

        let cmp = match field {
            SortField::Id => a.id.number().cmp(&b.id.number()),
            SortField::Customer => a
                .customer_name
                .to_lowercase()
                .cmp(&b.customer_name.to_lowercase()),
            SortField::Status => compare_status(&a.status, &b.status),
            SortField::Priority => compare_priority(&a.priority, &b.priority),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Store => a.store.to_lowercase().cmp(&b.store.to_lowercase()),
            SortField::Scheduled => Ordering::Equal,
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Workflow order: New → In Progress → On Hold → custom → Pending Approval → Resolved → Rejected
fn compare_status(a: &TicketStatus, b: &TicketStatus) -> Ordering {
    fn status_order(s: &TicketStatus) -> u8 {
        match s {
            TicketStatus::New => 0,
            TicketStatus::InProgress => 1,
            TicketStatus::OnHold => 2,
            TicketStatus::Custom(_) => 3,
            TicketStatus::PendingApproval => 4,
            TicketStatus::Resolved => 5,
            TicketStatus::Rejected => 6,
        }
    }
    status_order(a)
        .cmp(&status_order(b))
        .then_with(|| a.label().cmp(b.label()))
}

/// Most urgent first when ascending
fn compare_priority(a: &Priority, b: &Priority) -> Ordering {
    fn rank(p: &Priority) -> u8 {
        match p {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
            Priority::Custom(_) => 3,
        }
    }
    rank(a).cmp(&rank(b)).then_with(|| a.label().cmp(b.label()))
}

fn compare_option_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    order: SortOrder,
) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => match order {
            SortOrder::Ascending => a_date.cmp(&b_date),
            SortOrder::Descending => b_date.cmp(&a_date),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
