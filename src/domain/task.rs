use crate::domain::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for an internal task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TaskId {
    type Err = crate::error::InfofixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| crate::error::InfofixError::InvalidTaskId(s.to_string()))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    Normal,
    Urgent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    #[default]
    General,
    Meeting,
    Maintenance,
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "General"),
            Self::Meeting => write!(f, "Meeting"),
            Self::Maintenance => write!(f, "Maintenance"),
        }
    }
}

/// An internal work item assigned to a staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub due_at: DateTime<Utc>,
    pub assigned_to: UserId,
    pub created_by: UserId,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        due_at: DateTime<Utc>,
        assigned_to: UserId,
        created_by: UserId,
    ) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            due_at,
            assigned_to,
            created_by,
            status: TaskStatus::Pending,
            priority: TaskPriority::Normal,
            category: TaskCategory::General,
            notes: None,
            completed_at: None,
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
    }

    pub fn mark_pending(&mut self) {
        self.status = TaskStatus::Pending;
        self.completed_at = None;
    }

    pub fn toggle(&mut self, at: DateTime<Utc>) {
        if self.is_completed() {
            self.mark_pending();
        } else {
            self.mark_completed(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task::new(
            "Restock thermal paste",
            Utc::now(),
            UserId::new("tech-1"),
            UserId::new("mgr-1"),
        )
    }

    #[test]
    fn test_task_defaults() {
        let t = task();
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.priority, TaskPriority::Normal);
        assert_eq!(t.category, TaskCategory::General);
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_task_toggle() {
        let mut t = task();
        let now = Utc::now();

        t.toggle(now);
        assert!(t.is_completed());
        assert_eq!(t.completed_at, Some(now));

        t.toggle(now);
        assert!(!t.is_completed());
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_task_serialization() {
        let t = task()
            .with_priority(TaskPriority::Urgent)
            .with_category(TaskCategory::Maintenance);
        let json = serde_json::to_string(&t).unwrap();

        assert!(json.contains("\"priority\":\"urgent\""));
        assert!(json.contains("\"category\":\"maintenance\""));
        assert!(json.contains("\"status\":\"pending\""));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_task_id_parsing() {
        let id = TaskId::new();
        assert_eq!(TaskId::from_str(&id.to_string()).unwrap(), id);
        assert!(matches!(
            TaskId::from_str("nope"),
            Err(crate::error::InfofixError::InvalidTaskId(_))
        ));
    }
}
