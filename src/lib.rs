//! # INFOFIX Core
//!
//! Core business logic and domain models for the INFOFIX Services repair-shop
//! CRM: ticket intake and workflow, SLA tracking, technician task scheduling
//! and staff leaderboards.
//!
//! The rules in [`workflow`] and [`scheduling`] are pure functions over
//! in-memory records. [`service::ShopService`] wires them to a
//! [`storage::Storage`] backend.

pub mod domain;
pub mod error;
pub mod scheduling;
pub mod service;
pub mod storage;
pub mod workflow;

// Re-export commonly used types
pub use domain::{
    customer::{Customer, CustomerId},
    settings::{Shop, ShopSettings, SlaConfig},
    task::{Task, TaskId, TaskStatus},
    ticket::{Priority, Ticket, TicketId, TicketStatus},
    user::{Role, User, UserId},
};
pub use error::{InfofixError, Result, ValidationError};
pub use service::{ShopService, TicketDraft};
pub use storage::Storage;
pub use workflow::{TicketWorkflowEngine, TransitionContext};
