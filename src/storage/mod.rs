use crate::{
    domain::{Customer, CustomerId, Shop, Task, TaskId, Ticket, TicketId, User, UserId},
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;

/// Persistence for repair tickets
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Saves a ticket, replacing any previous version
    async fn save_ticket(&self, ticket: &Ticket) -> Result<()>;

    /// Loads a ticket by ID
    async fn load_ticket(&self, id: &TicketId) -> Result<Ticket>;

    /// Lists all tickets, ordered by ticket number
    async fn list_tickets(&self) -> Result<Vec<Ticket>>;

    /// Case-insensitive search over customer name, device and issue
    async fn search_tickets(&self, query: &str) -> Result<Vec<Ticket>>;

    async fn delete_ticket(&self, id: &TicketId) -> Result<()>;
}

/// Persistence for internal tasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn save_task(&self, task: &Task) -> Result<()>;

    async fn load_task(&self, id: &TaskId) -> Result<Task>;

    /// Lists all tasks, ordered by due date
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    async fn delete_task(&self, id: &TaskId) -> Result<()>;
}

/// Team members and customer accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn save_user(&self, user: &User) -> Result<()>;

    async fn load_user(&self, id: &UserId) -> Result<User>;

    async fn list_users(&self) -> Result<Vec<User>>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn save_customer(&self, customer: &Customer) -> Result<()>;

    async fn load_customer(&self, id: &CustomerId) -> Result<Customer>;

    async fn list_customers(&self) -> Result<Vec<Customer>>;

    /// Case-insensitive search over name, phone and email
    async fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        let query = query.to_string();
        Ok(self
            .list_customers()
            .await?
            .into_iter()
            .filter(|c| c.matches(&query))
            .collect())
    }
}

/// A complete backend: every record store plus the shop state
#[async_trait]
pub trait Storage: TicketStore + TaskStore + UserStore + CustomerStore {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Loads settings and the ticket counter
    async fn load_shop(&self) -> Result<Shop>;

    async fn save_shop(&self, shop: &Shop) -> Result<()>;

    /// Checks if the shop is initialized
    async fn is_initialized(&self) -> bool;
}
