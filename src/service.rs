//! Shop operations over a [`Storage`] backend.
//!
//! Each operation loads what it needs, checks the acting user's role, runs
//! the pure rules from [`crate::workflow`] and [`crate::scheduling`], then
//! persists the result.

use crate::{
    domain::{
        Customer, CustomerId, Device, Priority, Role, ShopSettings, Task, TaskId, Ticket,
        TicketId, TicketStatus, User, UserId,
    },
    error::{InfofixError, Result},
    scheduling::{self, CalendarEntry, LeaderboardEntry},
    storage::Storage,
    workflow::{self, DashboardStats, TicketWorkflowEngine, TransitionContext},
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Details captured at ticket intake
#[derive(Debug, Clone)]
pub struct TicketDraft {
    pub customer_id: CustomerId,
    pub device: Device,
    pub issue: String,
    pub store: String,
    pub priority: Priority,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<UserId>,
}

impl TicketDraft {
    pub fn new(customer_id: CustomerId, device: Device, store: impl Into<String>) -> Self {
        Self {
            customer_id,
            device,
            issue: String::new(),
            store: store.into(),
            priority: Priority::default(),
            scheduled_at: None,
            assigned_to: None,
        }
    }
}

pub struct ShopService<S> {
    storage: S,
}

impl<S: Storage> ShopService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn engine(&self) -> Result<TicketWorkflowEngine> {
        let shop = self.storage.load_shop().await?;
        Ok(TicketWorkflowEngine::new(shop.settings))
    }

    fn require_staff(actor: &User, action: &str) -> Result<()> {
        if actor.role == Role::Customer {
            warn!(user = %actor.id, action, "Permission denied");
            return Err(InfofixError::denied(actor.role, action));
        }
        Ok(())
    }

    fn require_lead(actor: &User, action: &str) -> Result<()> {
        if !actor.role.is_staff_lead() {
            warn!(user = %actor.id, action, "Permission denied");
            return Err(InfofixError::denied(actor.role, action));
        }
        Ok(())
    }

    fn require_admin(actor: &User, action: &str) -> Result<()> {
        if actor.role != Role::Admin {
            warn!(user = %actor.id, action, "Permission denied");
            return Err(InfofixError::denied(actor.role, action));
        }
        Ok(())
    }

    // Tickets

    /// Books a device in. Tickets opened by technicians wait in the review
    /// queue until a manager approves them.
    pub async fn open_ticket(&self, actor: &User, draft: TicketDraft) -> Result<Ticket> {
        Self::require_staff(actor, "open tickets")?;

        let mut shop = self.storage.load_shop().await?;
        let store = match shop.settings.resolve_store(&draft.store) {
            Some(store) => store.to_string(),
            None => return Err(InfofixError::UnknownStore(draft.store)),
        };
        let customer = self.storage.load_customer(&draft.customer_id).await?;

        // The number is reserved before the ticket is written. A failed write
        // leaves a gap in the sequence but never hands out a number twice.
        let id = shop.next_ticket_id();
        self.storage.save_shop(&shop).await?;

        let mut ticket = Ticket::new(id, customer.id, customer.name, draft.device, store);
        ticket.issue = draft.issue;
        ticket.priority = draft.priority;
        ticket.scheduled_at = draft.scheduled_at;
        ticket.assigned_to = draft.assigned_to;
        ticket.status = workflow::initial_status(actor.role);

        let created_at = ticket.created_at;
        ticket.record(
            created_at,
            actor.name.as_str(),
            "Created",
            Some(ticket.status.to_string()),
        );

        if let Err(e) = self.storage.save_ticket(&ticket).await {
            warn!(ticket = %ticket.id, error = %e, "Ticket number skipped");
            return Err(e);
        }
        info!(ticket = %ticket.id, status = %ticket.status, user = %actor.id, "Ticket opened");
        Ok(ticket)
    }

    /// Applies a status change (with any hold, rejection or transfer details)
    pub async fn update_ticket(
        &self,
        actor: &User,
        id: &TicketId,
        new_status: TicketStatus,
        context: &TransitionContext,
    ) -> Result<Ticket> {
        let ticket = self.storage.load_ticket(id).await?;
        if !workflow::can_update(&ticket, actor) {
            warn!(user = %actor.id, ticket = %id, "Permission denied");
            return Err(InfofixError::denied(actor.role, "update this ticket"));
        }

        let engine = self.engine().await?;
        let mut context = context.clone();
        if let Some(requested) = context.store.take() {
            if !requested.trim().is_empty() {
                let store = engine
                    .settings()
                    .resolve_store(&requested)
                    .ok_or_else(|| InfofixError::UnknownStore(requested.clone()))?;
                context.store = Some(store.to_string());
            }
        }

        let updated = engine
            .validate_transition(&ticket, new_status, &context)
            .map_err(|e| {
                warn!(ticket = %id, error = %e, "Ticket update rejected");
                e
            })?;

        if updated != ticket {
            self.storage.save_ticket(&updated).await?;
            info!(ticket = %id, status = %updated.status, user = %actor.id, "Ticket updated");
        }
        Ok(updated)
    }

    /// Assigns (or unassigns) the technician working on a ticket
    pub async fn assign_ticket(
        &self,
        actor: &User,
        id: &TicketId,
        technician: Option<&UserId>,
        now: DateTime<Utc>,
    ) -> Result<Ticket> {
        Self::require_lead(actor, "assign tickets")?;

        if let Some(tech_id) = technician {
            let target = self.storage.load_user(tech_id).await?;
            if !scheduling::can_assign(actor, &target) {
                warn!(user = %actor.id, target = %target.id, "Assignment not allowed");
                return Err(InfofixError::denied(
                    actor.role,
                    format!("assign work to {}", target.role),
                ));
            }
        }

        let mut ticket = self.storage.load_ticket(id).await?;
        ticket.assign(technician.cloned(), &actor.name, now);
        self.storage.save_ticket(&ticket).await?;
        info!(ticket = %id, technician = ?technician, "Ticket assigned");
        Ok(ticket)
    }

    /// Moves a ticket out of the review queue into the active workflow
    pub async fn approve_ticket(
        &self,
        actor: &User,
        id: &TicketId,
        now: DateTime<Utc>,
    ) -> Result<Ticket> {
        Self::require_lead(actor, "approve tickets")?;

        let ticket = self.storage.load_ticket(id).await?;
        if ticket.status != TicketStatus::PendingApproval {
            return Err(InfofixError::NotPendingApproval(id.to_string()));
        }

        let context = TransitionContext::new(actor.name.as_str(), now);
        let approved = workflow::validate_transition(&ticket, TicketStatus::New, &context)?;
        self.storage.save_ticket(&approved).await?;
        info!(ticket = %id, user = %actor.id, "Ticket approved");
        Ok(approved)
    }

    pub async fn delete_ticket(&self, actor: &User, id: &TicketId) -> Result<()> {
        if !workflow::can_delete_ticket(actor) {
            warn!(user = %actor.id, ticket = %id, "Permission denied");
            return Err(InfofixError::denied(actor.role, "delete tickets"));
        }
        self.storage.delete_ticket(id).await?;
        info!(ticket = %id, user = %actor.id, "Ticket deleted");
        Ok(())
    }

    /// The general ticket list for `actor`
    pub async fn list_tickets(&self, actor: &User) -> Result<Vec<Ticket>> {
        let tickets = self.storage.list_tickets().await?;
        Ok(workflow::visible_to(&tickets, actor)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn review_queue(&self, actor: &User) -> Result<Vec<Ticket>> {
        let tickets = self.storage.list_tickets().await?;
        Ok(workflow::review_queue(&tickets, actor)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Dashboard figures over every ticket `actor` can see
    pub async fn dashboard(&self, actor: &User, now: DateTime<Utc>) -> Result<DashboardStats> {
        Self::require_staff(actor, "view the dashboard")?;

        let engine = self.engine().await?;
        let tickets: Vec<Ticket> = self
            .storage
            .list_tickets()
            .await?
            .into_iter()
            .filter(|t| workflow::can_view(t, actor))
            .collect();
        let customers = self.storage.list_customers().await?;
        let team = self.storage.list_users().await?;

        Ok(engine.aggregate_stats(&tickets, &customers, &team, now))
    }

    // Tasks

    pub async fn create_task(&self, actor: &User, mut task: Task) -> Result<Task> {
        let assignee = self.storage.load_user(&task.assigned_to).await?;
        if !scheduling::can_assign(actor, &assignee) {
            warn!(user = %actor.id, target = %assignee.id, "Assignment not allowed");
            return Err(InfofixError::denied(
                actor.role,
                format!("assign tasks to {}", assignee.role),
            ));
        }

        task.created_by = actor.id.clone();
        self.storage.save_task(&task).await?;
        info!(task = %task.id, assignee = %task.assigned_to, "Task created");
        Ok(task)
    }

    /// Marks a task done; only its assignee or creator may do so
    pub async fn complete_task(
        &self,
        actor: &User,
        id: &TaskId,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let mut task = self.storage.load_task(id).await?;
        if task.assigned_to != actor.id && task.created_by != actor.id {
            warn!(user = %actor.id, task = %id, "Permission denied");
            return Err(InfofixError::denied(actor.role, "complete this task"));
        }

        if !task.is_completed() {
            task.mark_completed(now);
            self.storage.save_task(&task).await?;
            info!(task = %id, user = %actor.id, "Task completed");
        }
        Ok(task)
    }

    pub async fn delete_task(&self, actor: &User, id: &TaskId) -> Result<()> {
        let task = self.storage.load_task(id).await?;
        if !scheduling::can_delete_task(&task, actor) {
            warn!(user = %actor.id, task = %id, "Permission denied");
            return Err(InfofixError::denied(actor.role, "delete this task"));
        }
        self.storage.delete_task(id).await?;
        info!(task = %id, user = %actor.id, "Task deleted");
        Ok(())
    }

    pub async fn list_tasks(&self, actor: &User) -> Result<Vec<Task>> {
        let tasks = self.storage.list_tasks().await?;
        Ok(scheduling::visible_tasks(&tasks, actor)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let tasks = self.storage.list_tasks().await?;
        Ok(scheduling::score(&tasks))
    }

    /// Scheduled repairs and tasks for `actor` between `from` and `to`
    pub async fn calendar(
        &self,
        actor: &User,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CalendarEntry>> {
        Self::require_staff(actor, "view the schedule")?;

        let tickets = self.list_tickets(actor).await?;
        let tasks = self.list_tasks(actor).await?;
        Ok(scheduling::calendar(&tickets, &tasks, from, to))
    }

    // Customers, team and settings

    pub async fn register_customer(&self, actor: &User, customer: Customer) -> Result<Customer> {
        Self::require_staff(actor, "register customers")?;
        self.storage.save_customer(&customer).await?;
        info!(customer = %customer.id, "Customer registered");
        Ok(customer)
    }

    pub async fn search_customers(&self, actor: &User, query: &str) -> Result<Vec<Customer>> {
        Self::require_staff(actor, "search customers")?;
        self.storage.search_customers(query).await
    }

    pub async fn add_team_member(&self, actor: &User, member: User) -> Result<User> {
        Self::require_admin(actor, "manage the team")?;
        self.storage.save_user(&member).await?;
        info!(user = %member.id, role = %member.role, "Team member saved");
        Ok(member)
    }

    /// Replaces the shop settings, keeping the ticket counter
    pub async fn update_settings(&self, actor: &User, settings: ShopSettings) -> Result<()> {
        Self::require_admin(actor, "change settings")?;
        let mut shop = self.storage.load_shop().await?;
        shop.settings = settings;
        self.storage.save_shop(&shop).await?;
        info!(user = %actor.id, "Settings updated");
        Ok(())
    }
}
