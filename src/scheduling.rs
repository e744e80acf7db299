//! Task visibility, assignment permissions, leaderboard scoring and the
//! shared calendar of scheduled repairs and tasks.

use crate::domain::{Role, Task, TaskCategory, TaskId, Ticket, TicketId, User, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Points awarded per completed task
pub const POINTS_PER_TASK: u32 = 10;

/// Tasks `user` should see on their task list.
///
/// Admins and managers see what they created or were given; technicians see
/// only what is assigned to them.
pub fn visible_tasks<'a>(tasks: &'a [Task], user: &User) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| match user.role {
            Role::Admin | Role::Manager => {
                task.created_by == user.id || task.assigned_to == user.id
            }
            Role::Technician => task.assigned_to == user.id,
            Role::Customer => false,
        })
        .collect()
}

/// Whether `actor` may hand work to `target`
pub fn can_assign(actor: &User, target: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => target.role == Role::Technician || target.id == actor.id,
        Role::Technician | Role::Customer => false,
    }
}

/// Only the creator may delete a task
pub fn can_delete_task(task: &Task, user: &User) -> bool {
    task.created_by == user.id
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub assignee: UserId,
    pub completed: usize,
    pub points: u32,
}

/// Ranks assignees by completed-task points, highest first. Ties keep the
/// order in which assignees first appear in `tasks`.
pub fn score(tasks: &[Task]) -> Vec<LeaderboardEntry> {
    let mut board: Vec<LeaderboardEntry> = Vec::new();

    for task in tasks.iter().filter(|t| t.is_completed()) {
        match board.iter_mut().find(|e| e.assignee == task.assigned_to) {
            Some(entry) => {
                entry.completed += 1;
                entry.points += POINTS_PER_TASK;
            }
            None => board.push(LeaderboardEntry {
                assignee: task.assigned_to.clone(),
                completed: 1,
                points: POINTS_PER_TASK,
            }),
        }
    }

    // stable
    board.sort_by(|a, b| b.points.cmp(&a.points));
    board
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarSource {
    Ticket { id: TicketId },
    Task { id: TaskId, category: TaskCategory },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub at: DateTime<Utc>,
    pub title: String,
    pub assignee: Option<UserId>,
    pub source: CalendarSource,
}

/// Merges scheduled active tickets and tasks falling in `[from, to)` into a
/// single time-ordered list.
pub fn calendar(
    tickets: &[Ticket],
    tasks: &[Task],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<CalendarEntry> {
    let in_range = |at: &DateTime<Utc>| *at >= from && *at < to;

    let ticket_entries = tickets
        .iter()
        .filter(|t| t.is_active())
        .filter_map(|t| t.scheduled_at.filter(in_range).map(|at| (t, at)))
        .map(|(t, at)| CalendarEntry {
            at,
            title: format!(
                "{} - {} {} ({})",
                t.id, t.device.brand, t.device.model, t.customer_name
            ),
            assignee: t.assigned_to.clone(),
            source: CalendarSource::Ticket { id: t.id.clone() },
        });

    let task_entries = tasks
        .iter()
        .filter(|t| in_range(&t.due_at))
        .map(|t| CalendarEntry {
            at: t.due_at,
            title: t.title.clone(),
            assignee: Some(t.assigned_to.clone()),
            source: CalendarSource::Task {
                id: t.id,
                category: t.category,
            },
        });

    let mut entries: Vec<CalendarEntry> = ticket_entries.chain(task_entries).collect();
    entries.sort_by_key(|e| e.at);
    entries
}
