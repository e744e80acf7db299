use crate::{
    domain::{Ticket, TicketStatus},
    error::ValidationError,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Everything submitted alongside a status change
#[derive(Debug, Clone)]
pub struct TransitionContext {
    pub actor: String,
    pub at: DateTime<Utc>,
    pub rejection_note: Option<String>,
    pub hold_reason: Option<String>,
    /// Target store; `None` keeps the current one
    pub store: Option<String>,
    pub transfer_note: Option<String>,
}

impl TransitionContext {
    pub fn new(actor: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            at,
            rejection_note: None,
            hold_reason: None,
            store: None,
            transfer_note: None,
        }
    }

    pub fn with_rejection_note(mut self, note: impl Into<String>) -> Self {
        self.rejection_note = Some(note.into());
        self
    }

    pub fn with_hold_reason(mut self, reason: impl Into<String>) -> Self {
        self.hold_reason = Some(reason.into());
        self
    }

    pub fn with_transfer(mut self, store: impl Into<String>, note: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self.transfer_note = Some(note.into());
        self
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Checks a requested change against the ticket rules and returns the
/// updated ticket.
///
/// Rules:
/// - rejecting needs a rejection note (an already-rejected ticket keeps its note)
/// - moving to another store needs a transfer note
/// - putting a ticket on hold needs a hold reason
///
/// Supplying a hold reason switches the status to On Hold whatever status
/// was requested. Fields that are not part of the change are left as they
/// were; every applied change is appended to the ticket's history.
pub fn validate_transition(
    ticket: &Ticket,
    new_status: TicketStatus,
    context: &TransitionContext,
) -> Result<Ticket, ValidationError> {
    let hold_reason = non_blank(context.hold_reason.as_deref());
    let rejection_note = non_blank(context.rejection_note.as_deref());
    let transfer_note = non_blank(context.transfer_note.as_deref());

    let status = if hold_reason.is_some() && new_status != TicketStatus::OnHold {
        debug!(
            ticket = %ticket.id,
            requested = %new_status,
            "Hold reason supplied, switching status to On Hold"
        );
        TicketStatus::OnHold
    } else {
        new_status
    };

    if status == TicketStatus::Rejected
        && rejection_note.is_none()
        && non_blank(ticket.rejection_note.as_deref()).is_none()
    {
        return Err(ValidationError::MissingReason);
    }

    let target_store = context
        .store
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(&ticket.store))
        .map(str::to_string);

    if let Some(to_store) = &target_store {
        if transfer_note.is_none() {
            return Err(ValidationError::MissingTransferNote {
                to_store: to_store.clone(),
            });
        }
    }

    if status == TicketStatus::OnHold
        && hold_reason.is_none()
        && non_blank(ticket.hold_reason.as_deref()).is_none()
    {
        return Err(ValidationError::MissingHoldReason);
    }

    let at = context.at;
    let actor = context.actor.as_str();
    let mut next = ticket.clone();

    if status != ticket.status {
        next.record(
            at,
            actor,
            "Status changed",
            Some(format!("{} -> {}", ticket.status, status)),
        );
        next.status = status.clone();
    }

    match &hold_reason {
        Some(reason) if next.hold_reason.as_ref() != Some(reason) => {
            next.record(at, actor, "Put on hold", Some(reason.clone()));
            next.hold_reason = Some(reason.clone());
        }
        _ if status != TicketStatus::OnHold => next.hold_reason = None,
        _ => {}
    }

    if status == TicketStatus::Rejected {
        if let Some(note) = rejection_note {
            if next.rejection_note.as_ref() != Some(&note) {
                next.record(at, actor, "Rejected", Some(note.clone()));
                next.rejection_note = Some(note);
            }
        }
    } else {
        next.rejection_note = None;
    }

    if status == TicketStatus::Resolved {
        if next.resolved_at.is_none() {
            next.resolved_at = Some(at);
        }
    } else {
        next.resolved_at = None;
    }

    if let (Some(to_store), Some(note)) = (target_store, transfer_note) {
        next.record(
            at,
            actor,
            "Transferred",
            Some(format!("{} -> {}: {}", ticket.store, to_store, note)),
        );
        next.store = to_store;
        next.transfer_note = Some(note);
    }

    if next != *ticket {
        next.updated_at = at;
    }

    Ok(next)
}
