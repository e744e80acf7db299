pub mod customer;
pub mod settings;
pub mod sorting;
pub mod task;
pub mod ticket;
pub mod user;

pub use customer::{Customer, CustomerId};
pub use settings::{Shop, ShopSettings, SlaConfig, DEFAULT_ALLOWED_DAYS};
pub use sorting::{sort_tickets, SortField, SortOrder};
pub use task::{Task, TaskCategory, TaskId, TaskPriority, TaskStatus};
pub use ticket::{AuditEntry, Device, Priority, Ticket, TicketId, TicketStatus};
pub use user::{Role, User, UserId};
