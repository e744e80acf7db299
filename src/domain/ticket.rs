use crate::domain::{customer::CustomerId, user::UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unique identifier for a repair ticket (e.g., IFX1, IFX2, IFX100)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(String);

impl TicketId {
    const PREFIX: &'static str = "IFX";

    /// Creates a new TicketId from a counter
    pub fn new(counter: u32) -> Self {
        Self(format!("{}{}", Self::PREFIX, counter))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of the identifier
    pub fn number(&self) -> u32 {
        self.0
            .get(Self::PREFIX.len()..)
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

impl FromStr for TicketId {
    type Err = crate::error::InfofixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        let prefix = TicketId::PREFIX;

        if normalized.starts_with(prefix)
            && normalized.len() > prefix.len()
            && normalized[prefix.len()..].parse::<u32>().is_ok()
        {
            Ok(Self(normalized))
        } else {
            Err(crate::error::InfofixError::InvalidTicketId(s.to_string()))
        }
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow status of a ticket.
///
/// Shops may define extra status names; those are carried as `Custom` and
/// count as active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    New,
    InProgress,
    OnHold,
    PendingApproval,
    Resolved,
    Rejected,
    Custom(String),
}

impl TicketStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::OnHold => "On Hold",
            Self::PendingApproval => "Pending Approval",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
            Self::Custom(name) => name,
        }
    }

    /// Resolved and rejected tickets are closed out
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl From<String> for TicketStatus {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "new" => Self::New,
            "in progress" | "in_progress" => Self::InProgress,
            "on hold" | "on_hold" => Self::OnHold,
            "pending approval" | "pending_approval" => Self::PendingApproval,
            "resolved" => Self::Resolved,
            "rejected" => Self::Rejected,
            _ => Self::Custom(value.trim().to_string()),
        }
    }
}

impl From<&str> for TicketStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TicketStatus> for String {
    fn from(value: TicketStatus) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ticket urgency; custom names come from shop settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Custom(String),
}

impl Priority {
    pub fn label(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Custom(name) => name,
        }
    }

    /// Key used for SLA lookups
    pub fn sla_key(&self) -> String {
        self.label().to_lowercase()
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Custom(value.trim().to_string()),
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The device booked in for repair
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Device {
    pub device_type: String,
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

impl Device {
    pub fn new(
        device_type: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            device_type: device_type.into(),
            brand: brand.into(),
            model: model.into(),
            serial: None,
        }
    }
}

/// One line of a ticket's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A repair job tracked through the shop workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub device: Device,
    #[serde(default)]
    pub issue: String,
    pub store: String,
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    history: Vec<AuditEntry>,
}

impl Ticket {
    /// Creates a new ticket for a customer's device at a store
    pub fn new(
        id: TicketId,
        customer_id: CustomerId,
        customer_name: impl Into<String>,
        device: Device,
        store: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_id,
            customer_name: customer_name.into(),
            device,
            issue: String::new(),
            store: store.into(),
            status: TicketStatus::New,
            priority: Priority::default(),
            hold_reason: None,
            rejection_note: None,
            transfer_note: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
            scheduled_at: None,
            resolved_at: None,
            history: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assigned_to.as_ref() == Some(user)
    }

    /// Audit trail, oldest first
    pub fn history(&self) -> &[AuditEntry] {
        &self.history
    }

    /// Appends an audit entry. Entries are never edited or removed.
    pub fn record(
        &mut self,
        at: DateTime<Utc>,
        actor: impl Into<String>,
        action: impl Into<String>,
        detail: Option<String>,
    ) {
        self.history.push(AuditEntry {
            at,
            actor: actor.into(),
            action: action.into(),
            detail,
        });
    }

    /// Sets or clears the assigned technician
    pub fn assign(&mut self, technician: Option<UserId>, actor: &str, at: DateTime<Utc>) {
        if self.assigned_to == technician {
            return;
        }
        let detail = technician
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "Unassigned".to_string());
        self.assigned_to = technician;
        self.updated_at = at;
        self.record(at, actor, "Assigned", Some(detail));
    }

    /// Sets the scheduled date
    pub fn schedule(&mut self, date: Option<DateTime<Utc>>) {
        self.scheduled_at = date;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> Ticket {
        Ticket::new(
            TicketId::new(1),
            CustomerId::new(),
            "Ama Owusu",
            Device::new("Laptop", "Dell", "Latitude 5420"),
            "Accra Mall",
        )
    }

    #[test]
    fn test_ticket_id_creation() {
        assert_eq!(TicketId::new(1).as_str(), "IFX1");
        assert_eq!(TicketId::new(1000).as_str(), "IFX1000");
        assert_eq!(TicketId::new(42).number(), 42);
    }

    #[test]
    fn test_ticket_id_parsing() {
        assert_eq!(TicketId::from_str("IFX12").unwrap().as_str(), "IFX12");
        assert_eq!(TicketId::from_str("ifx7").unwrap().as_str(), "IFX7");

        assert!(TicketId::from_str("IFX").is_err());
        assert!(TicketId::from_str("IFXabc").is_err());
        assert!(TicketId::from_str("TKT1").is_err());
    }

    #[test]
    fn test_status_parsing_and_labels() {
        assert_eq!(TicketStatus::from("in progress"), TicketStatus::InProgress);
        assert_eq!(TicketStatus::from("On Hold"), TicketStatus::OnHold);
        assert_eq!(
            TicketStatus::from("Pending Approval"),
            TicketStatus::PendingApproval
        );
        assert_eq!(
            TicketStatus::from("Awaiting Parts"),
            TicketStatus::Custom("Awaiting Parts".to_string())
        );
        assert_eq!(TicketStatus::InProgress.to_string(), "In Progress");
    }

    #[test]
    fn test_active_statuses() {
        assert!(TicketStatus::New.is_active());
        assert!(TicketStatus::OnHold.is_active());
        assert!(TicketStatus::Custom("Awaiting Parts".to_string()).is_active());
        assert!(!TicketStatus::Resolved.is_active());
        assert!(!TicketStatus::Rejected.is_active());
    }

    #[test]
    fn test_priority_sla_key() {
        assert_eq!(Priority::High.sla_key(), "high");
        assert_eq!(Priority::from("URGENT").sla_key(), "urgent");
        assert_eq!(Priority::from("low"), Priority::Low);
    }

    #[test]
    fn test_status_and_priority_serialize_as_labels() {
        let mut t = ticket();
        t.status = TicketStatus::OnHold;
        t.priority = Priority::High;
        t.hold_reason = Some("Awaiting screen".to_string());

        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"status\":\"On Hold\""));
        assert!(json.contains("\"priority\":\"High\""));

        let back: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_assign_records_history() {
        let mut t = ticket();
        let now = Utc::now();

        t.assign(Some(UserId::new("tech-1")), "Manager Kofi", now);
        assert!(t.is_assigned_to(&UserId::new("tech-1")));
        assert_eq!(t.history().len(), 1);
        assert_eq!(t.history()[0].action, "Assigned");

        // Same assignee is a no-op
        t.assign(Some(UserId::new("tech-1")), "Manager Kofi", now);
        assert_eq!(t.history().len(), 1);

        t.assign(None, "Manager Kofi", now);
        assert_eq!(t.history()[1].detail.as_deref(), Some("Unassigned"));
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_string(&ticket()).unwrap();
        assert!(!json.contains("hold_reason"));
        assert!(!json.contains("resolved_at"));
        assert!(!json.contains("scheduled_at"));
    }

    #[test]
    fn test_deserialization_without_history() {
        let json = format!(
            r#"{{
            "id": "IFX3",
            "customer_id": "{}",
            "customer_name": "Yaw",
            "device": {{"device_type": "Phone", "brand": "Samsung", "model": "A52"}},
            "store": "Kumasi",
            "status": "In Progress",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }}"#,
            CustomerId::new()
        );

        let t: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(t.status, TicketStatus::InProgress);
        assert_eq!(t.priority, Priority::Medium);
        assert!(t.history().is_empty());
    }
}
