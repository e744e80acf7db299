//! Ticket workflow rules.
//!
//! Everything here is a pure function of the tickets, settings and acting
//! user passed in. Loading and saving records is left to [`crate::storage`].

pub mod sla;
pub mod stats;
pub mod transition;

pub use sla::{age_in_days, is_overdue};
pub use stats::{aggregate_stats, DashboardStats, LoadShare, TechnicianLoad};
pub use transition::{validate_transition, TransitionContext};

use crate::{
    domain::{Customer, Role, ShopSettings, SlaConfig, Ticket, TicketStatus, User},
    error::ValidationError,
};
use chrono::{DateTime, Utc};

/// Tickets that are neither resolved nor rejected
pub fn classify_active(tickets: &[Ticket]) -> Vec<&Ticket> {
    tickets.iter().filter(|t| t.is_active()).collect()
}

/// Whether `user` may see this ticket at all, review queue included
pub fn can_view(ticket: &Ticket, user: &User) -> bool {
    match user.role {
        Role::Admin | Role::Manager => true,
        Role::Technician => ticket.is_assigned_to(&user.id),
        Role::Customer => user.customer_id == Some(ticket.customer_id),
    }
}

/// Whether `user` may change the ticket's status, store or notes.
/// Pending Approval tickets are settled by admins and managers only.
pub fn can_update(ticket: &Ticket, user: &User) -> bool {
    match user.role {
        Role::Admin | Role::Manager => true,
        Role::Technician => {
            ticket.status != TicketStatus::PendingApproval && ticket.is_assigned_to(&user.id)
        }
        Role::Customer => false,
    }
}

pub fn can_delete_ticket(user: &User) -> bool {
    user.role == Role::Admin
}

/// General ticket list for `user`. Pending Approval tickets only show up in
/// [`review_queue`].
pub fn visible_to<'a>(tickets: &'a [Ticket], user: &User) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.status != TicketStatus::PendingApproval)
        .filter(|t| can_view(t, user))
        .collect()
}

/// Tickets awaiting approval; only admins and managers review them
pub fn review_queue<'a>(tickets: &'a [Ticket], user: &User) -> Vec<&'a Ticket> {
    if !user.role.is_staff_lead() {
        return Vec::new();
    }
    tickets
        .iter()
        .filter(|t| t.status == TicketStatus::PendingApproval)
        .collect()
}

/// Status a freshly opened ticket starts in
pub fn initial_status(role: Role) -> TicketStatus {
    match role {
        Role::Technician => TicketStatus::PendingApproval,
        _ => TicketStatus::New,
    }
}

/// Tickets grouped by status, groups in order of first appearance
pub fn group_by_status(tickets: &[Ticket]) -> Vec<(TicketStatus, Vec<&Ticket>)> {
    let mut groups: Vec<(TicketStatus, Vec<&Ticket>)> = Vec::new();
    for ticket in tickets {
        match groups.iter_mut().find(|(status, _)| *status == ticket.status) {
            Some((_, members)) => members.push(ticket),
            None => groups.push((ticket.status.clone(), vec![ticket])),
        }
    }
    groups
}

/// The ticket rules bound to one shop's settings
#[derive(Debug, Clone, Default)]
pub struct TicketWorkflowEngine {
    settings: ShopSettings,
}

impl TicketWorkflowEngine {
    pub fn new(settings: ShopSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ShopSettings {
        &self.settings
    }

    pub fn sla(&self) -> &SlaConfig {
        &self.settings.sla
    }

    pub fn classify_active<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        classify_active(tickets)
    }

    pub fn is_overdue(&self, ticket: &Ticket, now: DateTime<Utc>) -> bool {
        is_overdue(ticket, self.sla(), now)
    }

    pub fn overdue<'a>(&self, tickets: &'a [Ticket], now: DateTime<Utc>) -> Vec<&'a Ticket> {
        tickets
            .iter()
            .filter(|t| is_overdue(t, self.sla(), now))
            .collect()
    }

    pub fn validate_transition(
        &self,
        ticket: &Ticket,
        new_status: TicketStatus,
        context: &TransitionContext,
    ) -> Result<Ticket, ValidationError> {
        validate_transition(ticket, new_status, context)
    }

    pub fn visible_to<'a>(&self, tickets: &'a [Ticket], user: &User) -> Vec<&'a Ticket> {
        visible_to(tickets, user)
    }

    pub fn review_queue<'a>(&self, tickets: &'a [Ticket], user: &User) -> Vec<&'a Ticket> {
        review_queue(tickets, user)
    }

    pub fn aggregate_stats(
        &self,
        tickets: &[Ticket],
        customers: &[Customer],
        team: &[User],
        now: DateTime<Utc>,
    ) -> DashboardStats {
        aggregate_stats(tickets, customers, team, self.sla(), now)
    }
}
